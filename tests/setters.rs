//! Mutable configuration validation (`spec.md` §4.1, §6, §8 scenario 7).

mod support;

use std::time::Duration;

use poolkeeper::{Error, Pool};
use support::MockDriver;

fn pool() -> anyhow::Result<Pool<support::MockSession>> {
    let driver = MockDriver::new();
    Ok(Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(2)
        .poolmax(10)
        .build()?)
}

#[test]
fn setting_poolmin_above_poolmax_is_rejected() -> anyhow::Result<()> {
    let pool = pool()?;
    let result = pool.set_poolmin(11);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert_eq!(pool.poolmin(), 2);

    pool.close();
    Ok(())
}

#[test]
fn setting_poolmax_below_poolmin_is_rejected() -> anyhow::Result<()> {
    let pool = pool()?;
    let result = pool.set_poolmax(1);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert_eq!(pool.poolmax(), 10);

    pool.close();
    Ok(())
}

#[test]
fn setting_cleanup_interval_to_zero_is_rejected() -> anyhow::Result<()> {
    let pool = pool()?;
    let result = pool.set_cleanup_interval(Duration::ZERO);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));

    pool.close();
    Ok(())
}

#[test]
fn valid_setters_take_effect_immediately() -> anyhow::Result<()> {
    let pool = pool()?;
    pool.set_poolmin(3)?;
    pool.set_poolmax(6)?;
    pool.set_cleanup_interval(Duration::from_secs(5))?;
    pool.set_idle_timeout(Duration::from_secs(1))?;
    pool.set_healthcheck_on_acquire(false)?;

    assert_eq!(pool.poolmin(), 3);
    assert_eq!(pool.poolmax(), 6);
    assert_eq!(pool.cleanup_interval(), Duration::from_secs(5));
    assert_eq!(pool.idle_timeout(), Duration::from_secs(1));
    assert!(!pool.healthcheck_on_acquire());

    pool.close();
    Ok(())
}
