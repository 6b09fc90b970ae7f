//! Process bootstrap sequence

use core::ffi::CStr;

use shim_abi::Kernel;
use shim_posix::Runtime;

use crate::environ;
use crate::hooks::HookTable;
use crate::image::ProcessImage;

/// Run a program against `rt`
///
/// Order: publish the environment (to `rt` and to the process-wide
/// [`environ`](crate::environ::environ)), run initializers first to last, call
/// `main`, run finalizers last to first. Returns `main`'s status for the
/// caller to exit with.
pub fn run<K, F>(
    rt: &mut Runtime<K>,
    image: &ProcessImage<'_>,
    init: &HookTable<'_>,
    fini: &HookTable<'_>,
    main: F,
) -> i32
where
    K: Kernel,
    F: FnOnce(&mut Runtime<K>, &ProcessImage<'_>) -> i32,
{
    rt.set_environ(image.env().map(CStr::to_bytes));
    environ::publish(image.envp_ptr());
    log::info!(
        "bootstrap: argc={} envc={} init={} fini={}",
        image.argc(),
        image.env().len(),
        init.len(),
        fini.len()
    );

    init.run_forward();
    let status = main(rt, image);
    log::info!("bootstrap: entry point returned {}", status);
    fini.run_reverse();

    status
}
