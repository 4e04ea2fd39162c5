use super::suppress;
use crate::capture::{CapturedValue, encode};
use crate::dispatch::DispatchHandle;
use crate::domain::EventLevel;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::fmt::MakeWriter;

/// Wraps the raw error-output writer.
///
/// Every chunk reaches the inner writer exactly as issued, with its return
/// value and errors preserved; only bytes the inner writer accepted are then
/// forwarded, best-effort, as a `stderr-raw` event. The standard-output
/// channel is intentionally never wrapped.
pub struct ForwardWriter<W> {
    inner: W,
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

impl<W> ForwardWriter<W> {
    pub fn new(inner: W, handle: DispatchHandle, forwarding: Arc<AtomicBool>) -> Self {
        Self {
            inner,
            handle,
            forwarding,
        }
    }

    /// Consumes the wrapper, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn forward_chunk(&self, chunk: &[u8]) {
        if !self.forwarding.load(Ordering::Relaxed) || suppress::active() {
            return;
        }
        let text = String::from_utf8_lossy(chunk);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.handle
            .dispatch(encode(EventLevel::StderrRaw, &[CapturedValue::from(trimmed)]));
    }
}

impl<W: Write> Write for ForwardWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.forward_chunk(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Lifts [`ForwardWriter`] to the subscriber writer seam, so a host can wrap
/// whatever it routes to the error stream.
pub struct ForwardMakeWriter<M> {
    inner: M,
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

impl<M> ForwardMakeWriter<M> {
    pub fn new(inner: M, handle: DispatchHandle, forwarding: Arc<AtomicBool>) -> Self {
        Self {
            inner,
            handle,
            forwarding,
        }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ForwardMakeWriter<M> {
    type Writer = ForwardWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        ForwardWriter::new(
            self.inner.make_writer(),
            self.handle.clone(),
            self.forwarding.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::channel;

    fn wrapped_buffer(
        forwarding: bool,
    ) -> (ForwardWriter<Vec<u8>>, crate::dispatch::EventReceiver) {
        let (handle, rx) = channel(16);
        let writer = ForwardWriter::new(Vec::new(), handle, Arc::new(AtomicBool::new(forwarding)));
        (writer, rx)
    }

    #[test]
    fn original_bytes_are_preserved_exactly() {
        let (mut writer, _rx) = wrapped_buffer(true);

        let written = writer.write(b"plain diagnostic line\n").unwrap();
        assert_eq!(written, b"plain diagnostic line\n".len());
        assert_eq!(writer.into_inner(), b"plain diagnostic line\n");
    }

    #[test]
    fn each_chunk_yields_one_trimmed_stderr_event() {
        let (mut writer, mut rx) = wrapped_buffer(true);

        writer.write_all(b"plain diagnostic line\n").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.level, EventLevel::StderrRaw);
        assert_eq!(event.messages, vec!["plain diagnostic line".to_string()]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn whitespace_only_chunks_are_not_forwarded() {
        let (mut writer, mut rx) = wrapped_buffer(true);

        writer.write_all(b"\n").unwrap();
        writer.write_all(b"   \t\n").unwrap();

        assert_eq!(writer.into_inner(), b"\n   \t\n");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn invalid_utf8_is_decoded_best_effort() {
        let (mut writer, mut rx) = wrapped_buffer(true);

        writer.write_all(b"bad \xff byte\n").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.messages.len(), 1);
        assert!(event.messages[0].starts_with("bad "));
        assert!(event.messages[0].ends_with(" byte"));
    }

    #[test]
    fn suppressed_writes_forward_nothing() {
        let (mut writer, mut rx) = wrapped_buffer(true);

        suppress::guarded(|| writer.write_all(b"relay-internal failure report\n").unwrap());

        // The original write still happened.
        assert_eq!(writer.into_inner(), b"relay-internal failure report\n");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn disabled_forwarding_still_writes_through() {
        let (mut writer, mut rx) = wrapped_buffer(false);

        writer.write_all(b"still visible\n").unwrap();

        assert_eq!(writer.into_inner(), b"still visible\n");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn inner_write_errors_propagate_with_no_event() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("stream closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (handle, mut rx) = channel(16);
        let mut writer =
            ForwardWriter::new(FailingWriter, handle, Arc::new(AtomicBool::new(true)));

        assert!(writer.write(b"never lands").is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn make_writer_wraps_the_inner_seam() {
        let (handle, mut rx) = channel(16);
        let make = ForwardMakeWriter::new(
            io::sink,
            handle,
            Arc::new(AtomicBool::new(true)),
        );

        let mut writer = make.make_writer();
        writer.write_all(b"routed via MakeWriter\n").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.messages, vec!["routed via MakeWriter".to_string()]);
    }
}
