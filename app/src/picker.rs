//! Folder selection back ends.

use std::sync::Arc;

use dropwatch_core::DirectoryPicker;
#[cfg(not(feature = "picker"))]
use dropwatch_core::NullDirectoryPicker;

/// Picker for the enabled dialog back end, or one that always declines.
pub fn default_picker() -> Arc<dyn DirectoryPicker> {
    #[cfg(feature = "picker")]
    return Arc::new(portal::PortalDirectoryPicker);

    #[cfg(not(feature = "picker"))]
    Arc::new(NullDirectoryPicker)
}

#[cfg(feature = "picker")]
mod portal {
    use std::path::PathBuf;

    use dropwatch_core::DirectoryPicker;
    use pollster::FutureExt as _;
    use tracing::debug;

    /// Native folder dialog via the desktop portal.
    pub struct PortalDirectoryPicker;

    impl DirectoryPicker for PortalDirectoryPicker {
        fn choose(&self) -> Option<PathBuf> {
            let folder = rfd::AsyncFileDialog::new()
                .set_title("Choose a folder to watch")
                .pick_folder()
                .block_on();

            match folder {
                Some(handle) => Some(handle.path().to_path_buf()),
                None => {
                    debug!("folder dialog dismissed");
                    None
                }
            }
        }
    }
}
