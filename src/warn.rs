//! Printing statements to stderr, for warnings and (optionally)
//! progress information.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `info!` prints anything. Off by default; the command line
/// tool switches it on for `--verbose`.
pub static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(on: bool) {
    VERBOSE.store(on, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

#[macro_export]
macro_rules! warn {
    ($formatstr:expr $(,$arg:expr)*) => { {
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $formatstr $(,$arg)*);
        let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
        let _ = outp.flush();
    } }
}

/// Like `warn!`, but only prints if `VERBOSE` is set, and without the
/// source location.
#[macro_export]
macro_rules! info {
    ($formatstr:expr $(,$arg:expr)*) => { {
        if $crate::warn::is_verbose() {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "I: ");
            let _ = writeln!(&mut outp, $formatstr $(,$arg)*);
            let _ = outp.flush();
        }
    } }
}
