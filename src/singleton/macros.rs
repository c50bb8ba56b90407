/// Declares a function returning a process-wide, lazily built instance.
///
/// The function owns a `static` [`Singleton`](crate::Singleton); the first
/// call constructs the value, every later call (from any thread) returns the
/// same `&'static` reference without locking.
///
/// Prefer handing a `&Singleton` or the instance itself to the code that
/// needs it. Reach for this form only where no such handle can be threaded
/// through.
///
/// ```rust
/// use solo::singleton;
///
/// pub struct Settings {
///     pub verbose: bool,
/// }
///
/// singleton! {
///     /// Global settings, read once.
///     pub fn settings() -> Settings = Settings { verbose: true };
/// }
///
/// assert!(settings().verbose);
/// assert!(core::ptr::eq(settings(), settings()));
/// ```
#[macro_export]
macro_rules! singleton {
    ($(#[$meta:meta])* $vis:vis fn $name:ident() -> $ty:ty = $init:expr;) => {
        $(#[$meta])*
        $vis fn $name() -> &'static $ty {
            static INSTANCE: $crate::Singleton<$ty> = <$crate::Singleton<$ty>>::new(|| $init);
            INSTANCE.get_instance()
        }
    };
}
