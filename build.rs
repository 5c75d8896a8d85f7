fn main() {
    // Units resolve `hook` from the global scope, so the host must export it.
    println!("cargo:rustc-link-arg-bins=-rdynamic");
    println!("cargo:rustc-link-arg-tests=-rdynamic");
}
