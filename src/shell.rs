#![cfg(windows)]

use std::path::Path;

use windows::{
    core::{HRESULT, HSTRING},
    Win32::{
        System::Com::{
            CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER,
            COINIT_MULTITHREADED,
        },
        UI::Shell::{
            IShellItem, ISharedBitmap, IThumbnailCache, LocalThumbnailCache,
            SHCreateItemFromParsingName, WTS_CACHED, WTS_CACHEFLAGS, WTS_EXTRACTINPROC,
        },
    },
};

use crate::thumbnail::{ThumbnailCache, WarmError};

impl From<windows::core::Error> for WarmError {
    fn from(e: windows::core::Error) -> Self {
        WarmError::Platform(e.to_string())
    }
}

// One per worker thread, torn down when the thread exits.
struct Apartment {
    hr: HRESULT,
}

impl Apartment {
    fn enter() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        log::debug!("CoInitializeEx on {:?}: {:?}", std::thread::current().id(), hr);
        Apartment { hr }
    }
}

impl Drop for Apartment {
    fn drop(&mut self) {
        if self.hr.is_ok() {
            unsafe { CoUninitialize() };
        }
    }
}

thread_local! {
    static APARTMENT: Apartment = Apartment::enter();
}

fn ensure_com_initialized() -> windows::core::Result<()> {
    APARTMENT.with(|apartment| apartment.hr.ok())
}

/// The per-user Explorer thumbnail cache (`thumbcache_*.db`).
pub struct ShellThumbnailCache;

impl ThumbnailCache for ShellThumbnailCache {
    fn warm(&self, path: &Path, size: u32) -> Result<(), WarmError> {
        ensure_com_initialized()?;

        let cache: IThumbnailCache =
            unsafe { CoCreateInstance(&LocalThumbnailCache, None, CLSCTX_INPROC_SERVER) }?;
        let item: IShellItem = unsafe { SHCreateItemFromParsingName(&HSTRING::from(path), None) }?;

        let mut bitmap: Option<ISharedBitmap> = None;
        let mut flags = WTS_CACHEFLAGS::default();
        unsafe {
            cache.GetThumbnail(
                &item,
                size,
                WTS_EXTRACTINPROC,
                Some(&mut bitmap as *mut _),
                Some(&mut flags as *mut _),
                None,
            )
        }?;

        if flags.0 & WTS_CACHED.0 != 0 {
            log::debug!("already cached: {}", path.display());
        }

        // bitmap, item and cache release their references when dropped here
        Ok(())
    }
}
