#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().expect("home lock");
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    let old_base = std::env::var("CODESCRIBE_DIR").ok();
    unsafe {
        std::env::set_var("HOME", dir.path());
        std::env::remove_var("CODESCRIBE_DIR");
    }
    let result = func(dir.path());
    unsafe {
        match old_home {
            Some(old) => std::env::set_var("HOME", old),
            None => std::env::remove_var("HOME"),
        }
        match old_base {
            Some(old) => std::env::set_var("CODESCRIBE_DIR", old),
            None => std::env::remove_var("CODESCRIBE_DIR"),
        }
    }
    result
}
