//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::assembler::Assembler;
use crate::content::ContentLoader;
use crate::Site;

/// Build the site once
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(site);
    let posts = loader.load_posts()?;
    let pages = loader.load_pages()?;

    tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

    let assembler = Assembler::new(site)?;
    assembler.assemble(&posts, &pages)?;

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and rebuild
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(site.base_dir.as_ref(), notify::RecursiveMode::Recursive)?;

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let relevant = event
                    .paths
                    .iter()
                    .any(|p| is_relevant(p, &site.output_dir));
                if !relevant {
                    continue;
                }

                // Only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    if let Err(e) = run(site) {
                        tracing::error!("Build failed: {}", e);
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Continue waiting
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

/// Whether a changed path should trigger a rebuild.
///
/// Writes into the output directory must not retrigger the watcher.
pub(crate) fn is_relevant(path: &Path, output_dir: &Path) -> bool {
    if path.starts_with(output_dir) {
        return false;
    }
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_dir_changes_are_ignored() {
        let output = PathBuf::from("/site/_site");
        assert!(!is_relevant(Path::new("/site/_site/index.html"), &output));
        assert!(is_relevant(Path::new("/site/_posts/a.md"), &output));
    }

    #[test]
    fn test_editor_noise_is_ignored() {
        let output = PathBuf::from("/site/_site");
        assert!(!is_relevant(Path::new("/site/.git/HEAD"), &output));
        assert!(!is_relevant(Path::new("/site/about.md~"), &output));
        assert!(!is_relevant(Path::new("/site/.DS_Store"), &output));
    }
}
