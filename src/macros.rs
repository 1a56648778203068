/// Builds a [`KeyValues`](crate::KeyValues) tree from a JSON-like literal.
///
/// The result is an unnamed root whose children are the listed keys, in order.
/// Values may be nested blocks, `true`/`false` (written as `"1"`/`"0"`), `null`
/// (an empty node) or any expression implementing `Display`. Negative numbers
/// need parentheses: `"x": (-5)`.
///
/// # Examples
///
/// ```rust
/// use keyvalues::keyvalues;
///
/// let root = keyvalues!({
///     "LightmappedGeneric": {
///         "$basetexture": "nature/dirtfloor001a",
///         "$surfaceprop": "dirt",
///         "$ssbump": true
///     }
/// });
///
/// assert_eq!(
///     root.to_string(),
///     "\"LightmappedGeneric\" {\n\t\"$basetexture\" \"nature/dirtfloor001a\"\n\t\"$surfaceprop\" \"dirt\"\n\t\"$ssbump\" \"1\"\n}\n"
/// );
/// ```
#[macro_export]
macro_rules! keyvalues {
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut root = $crate::KeyValues::new();
        $(
            root.append($crate::keyvalues!(@node $key, $value));
        )*
        root
    }};

    (@node $key:expr, null) => {
        $crate::KeyValues::named($key)
    };

    (@node $key:expr, true) => {
        $crate::KeyValues::leaf($key, "1")
    };

    (@node $key:expr, false) => {
        $crate::KeyValues::leaf($key, "0")
    };

    (@node $key:expr, { $($child:literal : $value:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut block = $crate::KeyValues::container($key);
        $(
            block.append($crate::keyvalues!(@node $child, $value));
        )*
        block
    }};

    (@node $key:expr, $value:expr) => {
        $crate::KeyValues::leaf($key, ::std::string::ToString::to_string(&$value))
    };
}
