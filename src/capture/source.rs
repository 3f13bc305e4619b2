//! Polling a screen capture source until it yields a frame
//!
//! Platform capture (display media streams, portals, ...) lives in the host.
//! The host wraps it in a `FrameSource`; `capture_frame` waits for the first
//! usable frame under a deadline and always stops the source afterwards.

use std::time::Duration;

use image::RgbaImage;
use tokio::sync::watch;

use super::image::CapturedFrame;
use crate::config::EditorConfig;
use crate::error::CaptureError;

/// Result of one poll of a capture source
#[derive(Clone, Debug)]
pub enum FramePoll {
    /// The stream has no frame with real dimensions yet
    Pending,
    Ready(RgbaImage),
}

/// A live capture stream
pub trait FrameSource: Send {
    /// Check for a frame without blocking
    fn poll_frame(&mut self) -> Result<FramePoll, CaptureError>;

    /// Release the stream. Called exactly once by `capture_frame`.
    fn stop(&mut self);
}

/// Cancels an in-flight capture
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side of a `CancelHandle`
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token nobody can cancel
    pub fn never() -> Self {
        let (_, token) = cancel_pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if the handle is dropped first.
    async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Wait for the first frame from `source`.
///
/// Fails with `Timeout` if no frame is ready within `timeout`, `Cancelled`
/// if the token fires first, and with whatever the source reports otherwise.
/// The source is stopped on every path.
pub async fn capture_frame<S: FrameSource + ?Sized>(
    source: &mut S,
    timeout: Duration,
    poll_interval: Duration,
    cancel: &mut CancelToken,
) -> Result<CapturedFrame, CaptureError> {
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    let result = if cancel.is_cancelled() {
        Err(CaptureError::Cancelled)
    } else {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CaptureError::Cancelled),
            polled = tokio::time::timeout(timeout, poll_until_ready(source, poll_interval)) => {
                polled.unwrap_or(Err(CaptureError::Timeout { timeout_ms }))
            }
        }
    };
    source.stop();

    match result {
        Ok(rgba) => CapturedFrame::new(rgba),
        Err(err) => {
            match &err {
                CaptureError::Timeout { .. } => {
                    log::warn!("Timeout waiting for capture frame after {:?}", timeout)
                }
                CaptureError::Cancelled => log::debug!("Capture cancelled"),
                other => log::error!("Capture failed: {other}"),
            }
            Err(err)
        }
    }
}

/// `capture_frame` with the configured timeout and poll interval
pub async fn capture_with_config<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &EditorConfig,
    cancel: &mut CancelToken,
) -> Result<CapturedFrame, CaptureError> {
    capture_frame(
        source,
        Duration::from_millis(config.capture_timeout_ms),
        Duration::from_millis(config.capture_poll_interval_ms),
        cancel,
    )
    .await
}

async fn poll_until_ready<S: FrameSource + ?Sized>(
    source: &mut S,
    poll_interval: Duration,
) -> Result<RgbaImage, CaptureError> {
    let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut polls = 0usize;
    loop {
        ticker.tick().await;
        polls += 1;
        match source.poll_frame()? {
            FramePoll::Ready(rgba) if rgba.width() > 0 && rgba.height() > 0 => {
                log::debug!("Capture frame ready after {} polls", polls);
                return Ok(rgba);
            }
            FramePoll::Ready(_) | FramePoll::Pending => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that becomes ready after a fixed number of polls
    struct ScriptedSource {
        pending_polls: usize,
        polls: usize,
        fail_with: Option<CaptureError>,
        stops: usize,
    }

    impl ScriptedSource {
        fn ready_after(pending_polls: usize) -> Self {
            Self {
                pending_polls,
                polls: 0,
                fail_with: None,
                stops: 0,
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn poll_frame(&mut self) -> Result<FramePoll, CaptureError> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            self.polls += 1;
            if self.polls > self.pending_polls {
                Ok(FramePoll::Ready(RgbaImage::new(4, 3)))
            } else {
                Ok(FramePoll::Pending)
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(2000);
    const POLL: Duration = Duration::from_millis(50);

    #[tokio::test(start_paused = true)]
    async fn test_frame_after_pending_polls() {
        let mut source = ScriptedSource::ready_after(5);
        let frame = capture_frame(&mut source, TIMEOUT, POLL, &mut CancelToken::never())
            .await
            .unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert_eq!(source.stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_source() {
        let mut source = ScriptedSource::ready_after(usize::MAX);
        let err = capture_frame(&mut source, TIMEOUT, POLL, &mut CancelToken::never())
            .await
            .unwrap_err();
        assert_eq!(err, CaptureError::Timeout { timeout_ms: 2000 });
        assert_eq!(source.stops, 1);
        assert!(source.polls >= 2000 / 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_propagates() {
        let mut source = ScriptedSource::ready_after(0);
        source.fail_with = Some(CaptureError::PermissionDenied);
        let err = capture_frame(&mut source, TIMEOUT, POLL, &mut CancelToken::never())
            .await
            .unwrap_err();
        assert_eq!(err, CaptureError::PermissionDenied);
        assert_eq!(source.stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_ready() {
        let mut source = ScriptedSource::ready_after(usize::MAX);
        let (handle, mut token) = cancel_pair();
        let cancel_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            handle.cancel();
        });
        let err = capture_frame(&mut source, TIMEOUT, POLL, &mut token)
            .await
            .unwrap_err();
        assert_eq!(err, CaptureError::Cancelled);
        assert_eq!(source.stops, 1);
        cancel_task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_polls() {
        let mut source = ScriptedSource::ready_after(0);
        let (handle, mut token) = cancel_pair();
        handle.cancel();
        let err = capture_frame(&mut source, TIMEOUT, POLL, &mut token)
            .await
            .unwrap_err();
        assert_eq!(err, CaptureError::Cancelled);
        assert_eq!(source.polls, 0);
        assert_eq!(source.stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_with_config_defaults() {
        let mut source = ScriptedSource::ready_after(1);
        let frame = capture_with_config(&mut source, &EditorConfig::default(), &mut CancelToken::never())
            .await
            .unwrap();
        assert_eq!(frame.data.decode().unwrap().dimensions(), (4, 3));
    }
}
