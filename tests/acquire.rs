//! Acquire: growth on demand, capping, blocking/timeout semantics, and
//! acquire-time health checks (`spec.md` §4.2, §8 scenarios 3, 8, 9).

mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;

use poolkeeper::Pool;
use support::MockDriver;

#[test]
fn grows_on_demand_up_to_poolmax() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let pool = Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(2)
        .poolmax(4)
        .build()?;

    let handles: Vec<_> = (0..4)
        .map(|_| pool.acquire(true, None).unwrap().unwrap())
        .collect();

    let stats = pool.stats();
    assert_eq!(stats.poolsize, 4);
    assert_eq!(stats.poolused, 4);
    assert_eq!(stats.poolfree, 0);

    // Pool is at capacity: a non-blocking (zero-timeout) acquire misses.
    let fifth = pool.acquire(true, Some(Duration::ZERO))?;
    assert!(fifth.is_none());
    assert_eq!(pool.stats().poolsize, 4);

    drop(handles);
    pool.close();
    Ok(())
}

#[test]
fn non_blocking_acquire_returns_none_when_empty() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let pool = Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(1)
        .poolmax(1)
        .build()?;

    let _held = pool.acquire(true, None)?.unwrap();
    let second = pool.acquire(false, None)?;
    assert!(second.is_none());

    pool.close();
    Ok(())
}

#[test]
fn blocked_acquire_wakes_on_release() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let pool = Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(1)
        .poolmax(5)
        .poolinit(1)
        .build()?;

    let handles: Vec<_> = (0..5)
        .map(|_| pool.acquire(true, None).unwrap().unwrap())
        .collect();
    assert_eq!(pool.stats().poolused, 5);

    let waiter_pool = pool.clone();
    let waiter = std::thread::spawn(move || waiter_pool.acquire(true, Some(Duration::from_secs(5))));

    // Give the waiter a chance to actually block on the condvar.
    std::thread::sleep(Duration::from_millis(100));

    let mut handles = handles;
    let first = handles.remove(0);
    first.close();

    let result = waiter.join().expect("waiter thread panicked")?;
    assert!(result.is_some());

    drop(handles);
    drop(result);
    pool.close();
    Ok(())
}

#[test]
fn failed_health_check_drains_candidates_until_growth_also_fails() -> anyhow::Result<()> {
    use poolkeeper::Error;

    let driver = MockDriver::new();
    let pool = Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(3)
        .poolmax(3)
        .healthcheck_on_acquire(true)
        .build()?;
    assert_eq!(pool.stats().poolsize, 3);

    // Every free candidate now fails the acquire-time probe, and the
    // driver can no longer open replacements: acquire destroys all three
    // free members one at a time before the growth attempt itself fails
    // and the connect error propagates to the caller (`spec.md` §4.2 step
    // 4, §7).
    driver.healthy.store(false, Ordering::SeqCst);
    driver.fail_connect.store(true, Ordering::SeqCst);

    let result = pool.acquire(true, None);
    assert!(matches!(result, Err(Error::ConnectFailure(_))));
    assert_eq!(pool.stats().poolsize, 0);
    assert_eq!(driver.closes(), 3);

    pool.close();
    Ok(())
}

#[test]
fn healthcheck_on_acquire_can_be_disabled() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    driver.healthy.store(false, Ordering::SeqCst);

    let pool = Pool::builder()
        .connfunc(driver.connfunc())
        .poolmin(1)
        .poolmax(1)
        .healthcheck_on_acquire(false)
        .build()?;

    // With the probe disabled, an unhealthy session is still handed out.
    let handle = pool.acquire(true, None)?;
    assert!(handle.is_some());

    drop(handle);
    pool.close();
    Ok(())
}
