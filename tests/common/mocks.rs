//! Mock version of std::fs::File;
use mockall::mock;

use std::io::{self, Seek, SeekFrom, Write};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
    impl Seek for File {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
    }
}

/// A file on a full disk: every write fails, seeking and flushing succeed.
pub fn full_disk_file() -> MockFile {
    let mut file = MockFile::new();
    file.expect_write()
        .returning(|_| Err(io::Error::other("No space left on device")));
    file.expect_seek().returning(|_| Ok(0));
    file.expect_flush().returning(|| Ok(()));
    file
}
