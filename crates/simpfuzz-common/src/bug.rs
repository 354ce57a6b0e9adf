use std::{fmt, panic::Location};

#[macro_export]
macro_rules! bug {
    () => ( $crate::bug!("impossible case reached") );
    ($msg:expr) => ({ $crate::bug::bug_fmt(::std::format_args!($msg)) });
    ($msg:expr,) => ({ $crate::bug!($msg) });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::bug::bug_fmt(::std::format_args!($fmt, $($arg)+))
    });
}

/// Like [`bug!`] but only fires when `$cond` is false.
#[macro_export]
macro_rules! bug_unless {
    ($cond:expr, $($arg:tt)+) => ({
        if !$cond {
            $crate::bug!($($arg)+)
        }
    });
}

#[track_caller]
pub fn bug_fmt(args: fmt::Arguments<'_>) -> ! {
    let location = Location::caller();
    std::panic::panic_any(format!("{location}: {args}"))
}
