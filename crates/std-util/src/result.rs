#[macro_export]
macro_rules! assert_err {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Err(e) => e,
            actual => {
                use std::fmt::Write;
                let mut msg = format!("expected `Err`; actual={:?}", actual);

                $(
                    write!(msg, ", ").unwrap();
                    write!(msg, $($t)*).unwrap();
                )?

                panic!("{}", msg);
            }
        }
    };
}

/// Asserts the expression fails with an error matching the given predicate
/// method, e.g. `assert_err_is!(cursor.next(), is_end_of_file)`.
#[macro_export]
macro_rules! assert_err_is {
    ($e:expr, $kind:ident) => {
        match $e {
            Err(e) if e.$kind() => e,
            Err(e) => panic!(
                "expected error satisfying `{}`; actual={:?}",
                stringify!($kind),
                e
            ),
            Ok(v) => panic!("expected `Err`; actual=Ok({:?})", v),
        }
    };
}

#[macro_export]
macro_rules! assert_ok {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => panic!("expected `Ok`; actual=Err({e:?})"),
        }
    };
}
