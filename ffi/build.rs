use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    // Written next to the crate, not OUT_DIR, so C consumers find it at a stable path.
    let out = crate_dir.join("include").join("ra_ffi.h");

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RA_FFI_H")
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=cbindgen failed: {e}");
            return;
        }
    };

    let mut header = Vec::new();
    bindings.write(&mut header);
    if std::fs::read(&out).is_ok_and(|current| current == header) {
        return;
    }
    let written = match out.parent() {
        Some(dir) => std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&out, &header)),
        None => std::fs::write(&out, &header),
    };
    if let Err(e) = written {
        println!("cargo:warning=could not write {}: {e}", out.display());
    }
}
