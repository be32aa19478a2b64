use microdnn::primitive::{ExecConfig, GRAIN_ENV, NUM_THREADS_ENV};

// Single test: environment variables are process-wide.
#[test]
fn exec_config_from_env() {
    std::env::remove_var(NUM_THREADS_ENV);
    std::env::remove_var(GRAIN_ENV);
    assert_eq!(ExecConfig::from_env(), ExecConfig::default());

    std::env::set_var(NUM_THREADS_ENV, "3");
    std::env::set_var(GRAIN_ENV, "64");
    let config = ExecConfig::from_env();
    assert_eq!(config.num_threads, Some(3));
    assert_eq!(config.grain, 64);

    std::env::set_var(NUM_THREADS_ENV, "0");
    std::env::set_var(GRAIN_ENV, "lots");
    assert_eq!(ExecConfig::from_env(), ExecConfig::default());

    std::env::remove_var(NUM_THREADS_ENV);
    std::env::remove_var(GRAIN_ENV);
}
