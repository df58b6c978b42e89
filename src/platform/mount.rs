use anyhow::{Context, Result};
use log::warn;

/// Mount a filesystem. A failed mount is followed by exactly one format
/// and one more mount attempt; the second failure is returned.
pub fn mount_or_format<E, R, F>(label: &str, mut register: R, format: F) -> Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
    R: FnMut() -> Result<(), E>,
    F: FnOnce() -> Result<(), E>,
{
    if let Err(e) = register() {
        warn!("{} mount failed ({}), formatting", label, e);
        format().with_context(|| format!("{} format failed", label))?;
        register().with_context(|| format!("{} mount failed after format", label))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    fn err() -> io::Error {
        io::Error::other("corrupt")
    }

    #[test]
    fn healthy_partition_is_not_formatted() {
        let mounts = Cell::new(0);
        let formats = Cell::new(0);
        mount_or_format(
            "data",
            || {
                mounts.set(mounts.get() + 1);
                Ok::<(), io::Error>(())
            },
            || {
                formats.set(formats.get() + 1);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!((mounts.get(), formats.get()), (1, 0));
    }

    #[test]
    fn failed_mount_formats_once_and_retries() {
        let mounts = Cell::new(0);
        let formats = Cell::new(0);
        mount_or_format(
            "data",
            || {
                mounts.set(mounts.get() + 1);
                if mounts.get() == 1 { Err(err()) } else { Ok(()) }
            },
            || {
                formats.set(formats.get() + 1);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!((mounts.get(), formats.get()), (2, 1));
    }

    #[test]
    fn second_failure_is_returned_without_another_format() {
        let mounts = Cell::new(0);
        let formats = Cell::new(0);
        let result = mount_or_format(
            "data",
            || {
                mounts.set(mounts.get() + 1);
                Err(err())
            },
            || {
                formats.set(formats.get() + 1);
                Ok(())
            },
        );
        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("mount failed after format"), "{}", msg);
        assert_eq!((mounts.get(), formats.get()), (2, 1));
    }

    #[test]
    fn failed_format_skips_the_retry() {
        let mounts = Cell::new(0);
        let result = mount_or_format(
            "data",
            || {
                mounts.set(mounts.get() + 1);
                Err(err())
            },
            || Err(err()),
        );
        assert!(result.is_err());
        assert_eq!(mounts.get(), 1);
    }
}
