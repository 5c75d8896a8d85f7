/// Defines the `hook` symbol a host binary exports to its units.
///
/// The generated function forwards to [`hook::dispatch`](crate::hook::dispatch).
/// The binary must also be linked with `-rdynamic` so the symbol lands in the
/// dynamic symbol table.
///
/// ```rust,ignore
/// dlhook::export_hook!();
///
/// fn main() {
///     std::hint::black_box(hook as dlhook::abi::HookFn);
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! export_hook {
    () => {
        /// # Safety
        /// `message` must be null or a valid NUL-terminated string.
        #[no_mangle]
        pub unsafe extern "C" fn hook(message: *const ::std::ffi::c_char) {
            $crate::hook::dispatch(message)
        }
    };
}
