use std::borrow::Cow;

use kstring::KString;

// A separate trait from `From` so that the builders can accept all
// the usual string types (and a few scalars, which end up as
// attribute values) without ambiguity.
pub trait MyFrom<T> {
    fn myfrom(s: T) -> Self;
}

// Can't do KString::from_static: no way to have a separate trait impl
// for &'static.
impl MyFrom<&str> for KString {
    fn myfrom(s: &str) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<&&str> for KString {
    fn myfrom(s: &&str) -> Self {
        KString::from_ref(*s)
    }
}

impl MyFrom<&String> for KString {
    fn myfrom(s: &String) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<String> for KString {
    fn myfrom(s: String) -> Self {
        KString::from_string(s)
    }
}

impl MyFrom<&KString> for KString {
    fn myfrom(s: &KString) -> Self {
        s.clone()
    }
}

impl MyFrom<KString> for KString {
    fn myfrom(s: KString) -> Self {
        s
    }
}

impl<'t> MyFrom<Cow<'t, str>> for KString {
    fn myfrom(s: Cow<'t, str>) -> Self {
        match s {
            Cow::Borrowed(s) => KString::from_ref(s),
            Cow::Owned(s) => KString::from_string(s),
        }
    }
}

impl MyFrom<usize> for KString {
    fn myfrom(val: usize) -> Self {
        KString::from_string(val.to_string())
    }
}

impl MyFrom<i64> for KString {
    fn myfrom(val: i64) -> Self {
        KString::from_string(val.to_string())
    }
}

impl MyFrom<bool> for KString {
    fn myfrom(val: bool) -> Self {
        KString::from_static(if val { "true" } else { "false" })
    }
}

pub fn ks<T>(s: T) -> KString
where KString: MyFrom<T>
{
    KString::myfrom(s)
}
