use clap::Parser;
use redis_docsearch::StoreOpts;
use std::time::Duration;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    opts: StoreOpts,
}

#[test]
fn test_store_opts_defaults() {
    let cli = TestCli::parse_from(["test"]);
    let opts = cli.opts;

    if std::env::var("REDIS_URL").is_err() {
        assert_eq!(opts.redis_url, "redis://localhost:6379/0");
    }
    assert_eq!(opts.connect_timeout, Duration::from_secs(5));
    assert_eq!(opts.response_timeout, Duration::from_secs(3));
    assert_eq!(opts.pool_timeout, Duration::from_secs(4));
}

#[test]
fn test_store_opts_overrides() {
    let cli = TestCli::parse_from([
        "test",
        "--redis-url",
        "redis://:pw@cache:6380/2",
        "--max-connections",
        "64",
        "--response-timeout",
        "250ms",
    ]);
    let config = cli.opts.store_config();

    assert_eq!(config.max_in_flight, 64);
    assert_eq!(config.response_timeout, Duration::from_millis(250));
    assert_eq!(config.scan_count, 1000);
}

#[test]
fn test_store_opts_rejects_bad_duration() {
    let result = TestCli::try_parse_from(["test", "--connect-timeout", "soon"]);
    assert!(result.is_err());
}

#[test]
fn test_zero_connections_clamped() {
    let cli = TestCli::parse_from(["test", "--max-connections", "0"]);
    assert_eq!(cli.opts.store_config().max_in_flight, 1);
}
