//! Clean the output directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the output directory
pub fn run(site: &Site) -> Result<()> {
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir)?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_output_only() {
        let tmp = tempfile::tempdir().unwrap();
        let site = Site::new(tmp.path()).unwrap();

        fs::create_dir_all(site.output_dir.join("deep")).unwrap();
        fs::write(site.output_dir.join("deep/file.html"), "x").unwrap();
        fs::write(tmp.path().join("keep.md"), "# keep").unwrap();

        run(&site).unwrap();

        assert!(!site.output_dir.exists());
        assert!(tmp.path().join("keep.md").exists());

        // Cleaning an already-clean site is fine
        run(&site).unwrap();
    }
}
