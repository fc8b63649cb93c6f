//! `SIGINT` handling: on Ctrl-C, dump whatever the framebuffer holds to
//! `partial.bmp` and exit, mirroring the reference's `g_img`/
//! `InterruptHandler` pair. The reference keeps the in-progress image behind
//! a bare global pointer; here it's an [`OnceLock`] guarding a [`Mutex`], so
//! there's exactly one place the handler reaches into instead of an ambient
//! static the rest of the program could alias.

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, OnceLock};

use parking_lot::Mutex;
use tracer_render::FrameBuffer;

struct PartialRenderHandle {
    framebuffer: Arc<StdMutex<FrameBuffer>>,
    output_path: PathBuf,
}

static HANDLE: OnceLock<Mutex<Option<PartialRenderHandle>>> = OnceLock::new();

fn handle_slot() -> &'static Mutex<Option<PartialRenderHandle>> {
    HANDLE.get_or_init(|| Mutex::new(None))
}

/// Registers the framebuffer a `SIGINT` should dump, and installs the
/// handler. Must be called once, before rendering starts.
pub fn install(framebuffer: Arc<StdMutex<FrameBuffer>>, output_path: PathBuf) {
    *handle_slot().lock() = Some(PartialRenderHandle { framebuffer, output_path });

    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
    }
}

/// Clears the registered handle once rendering finishes normally, so a
/// `SIGINT` delivered afterward (e.g. during export) doesn't race the
/// framebuffer.
pub fn clear() {
    *handle_slot().lock() = None;
}

extern "C" fn on_sigint(_sig: libc::c_int) {
    let guard = handle_slot().lock();
    let Some(handle) = guard.as_ref() else {
        std::process::exit(130);
    };

    let fb = handle.framebuffer.lock().unwrap();
    let result = tracer_io::write_bmp(&handle.output_path, fb.width(), fb.height(), fb.as_rgb_bytes());

    match result {
        Ok(()) => eprintln!("interrupted: wrote partial render to {}", handle.output_path.display()),
        Err(e) => eprintln!("interrupted: failed to write partial render: {e}"),
    }

    std::process::exit(130);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_clear_round_trip_without_crashing() {
        let fb = Arc::new(StdMutex::new(FrameBuffer::new(2, 2)));
        install(fb, PathBuf::from("partial_test_unused.bmp"));
        assert!(handle_slot().lock().is_some());
        clear();
        assert!(handle_slot().lock().is_none());
    }
}
