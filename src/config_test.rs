use super::*;

#[test]
fn with_root_is_used_verbatim() {
    let cfg = Config::with_root("/tmp/somewhere");
    assert_eq!(cfg.root, PathBuf::from("/tmp/somewhere"));
}

#[test]
fn env_var_overrides_home_default() {
    std::env::set_var(ROOT_ENV_VAR, "/tmp/docudb-test-root");
    let cfg = Config::from_env();
    std::env::remove_var(ROOT_ENV_VAR);
    assert_eq!(cfg.root, PathBuf::from("/tmp/docudb-test-root"));
}
