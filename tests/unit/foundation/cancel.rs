use super::*;
use std::time::Duration;

#[tokio::test]
async fn cancel_wakes_every_observer() {
    let (handle, mut a) = CancelHandle::new();
    let mut b = handle.signal();
    assert!(!a.is_cancelled());

    let waiter = tokio::spawn(async move {
        b.cancelled().await;
    });
    handle.cancel();
    a.cancelled().await;
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(a.is_cancelled());
}

#[tokio::test]
async fn never_signal_does_not_fire() {
    let mut s = CancelSignal::never();
    let res = tokio::time::timeout(Duration::from_millis(20), s.cancelled()).await;
    assert!(res.is_err());
}
