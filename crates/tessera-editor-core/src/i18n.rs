//! Message lookup with a process-wide observable locale.
//!
//! The locale lives on the UI thread; `set_locale` notifies subscribers
//! synchronously in subscription order. Lookups fall back to English, then
//! to the raw key.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    #[default]
    En,
    ZhCn,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh-CN",
        }
    }

    /// Parse a BCP 47 tag, matching on the primary language.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "zh" => Some(Locale::ZhCn),
            _ => None,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn Fn(Locale)>;

thread_local! {
    static CURRENT: Cell<Locale> = const { Cell::new(Locale::En) };
    static LISTENERS: RefCell<Vec<(u64, std::rc::Rc<Listener>)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

pub fn locale() -> Locale {
    CURRENT.with(Cell::get)
}

/// Change the locale and notify subscribers. No-op when unchanged.
pub fn set_locale(locale: Locale) {
    let previous = CURRENT.with(|c| c.replace(locale));
    if previous == locale {
        return;
    }
    tracing::debug!(target: "tessera::i18n", from = previous.tag(), to = locale.tag(), "locale changed");

    // Snapshot so listeners may (un)subscribe while being notified.
    let listeners: Vec<_> = LISTENERS.with(|l| l.borrow().iter().map(|(_, f)| f.clone()).collect());
    for listener in listeners {
        listener(locale);
    }
}

pub fn subscribe(listener: impl Fn(Locale) + 'static) -> Subscription {
    let id = NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    });
    let listener: Listener = Box::new(listener);
    LISTENERS.with(|l| l.borrow_mut().push((id, std::rc::Rc::new(listener))));
    Subscription(id)
}

pub fn unsubscribe(subscription: Subscription) {
    LISTENERS.with(|l| l.borrow_mut().retain(|(id, _)| *id != subscription.0));
}

/// Translate a key in the current locale.
pub fn translate(key: &str) -> SmolStr {
    translate_in(locale(), key)
}

pub fn translate_in(locale: Locale, key: &str) -> SmolStr {
    lookup(locale, key)
        .or_else(|| lookup(Locale::En, key))
        .map(SmolStr::new_static)
        .unwrap_or_else(|| SmolStr::new(key))
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    match locale {
        Locale::En => match key {
            "columns.error.nested" => Some("Columns cannot be placed inside another column"),
            "columns.error.count" => Some("Column count must be between 2 and 7"),
            "columns.error.max" => Some("This layout already has the maximum number of columns"),
            "columns.error.target" => Some("Nothing to drop onto here"),
            "columns.error.patch" => Some("The column layout could not be updated"),
            "heading.placeholder" => Some("Heading"),
            "paragraph.placeholder" => Some("Type something…"),
            _ => None,
        },
        Locale::ZhCn => match key {
            "columns.error.nested" => Some("分栏不能嵌套在另一个分栏中"),
            "columns.error.count" => Some("分栏数量必须在 2 到 7 之间"),
            "columns.error.max" => Some("该布局的分栏数量已达上限"),
            "heading.placeholder" => Some("标题"),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            translate_in(Locale::ZhCn, "heading.placeholder").as_str(),
            "标题"
        );
        // Missing in zh-CN, present in English.
        assert_eq!(
            translate_in(Locale::ZhCn, "columns.error.target").as_str(),
            "Nothing to drop onto here"
        );
        assert_eq!(translate_in(Locale::En, "no.such.key").as_str(), "no.such.key");
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = subscribe(move |l| sink.borrow_mut().push(l));

        set_locale(Locale::ZhCn);
        set_locale(Locale::ZhCn);
        assert_eq!(translate("heading.placeholder").as_str(), "标题");
        set_locale(Locale::En);
        unsubscribe(sub);
        set_locale(Locale::ZhCn);
        set_locale(Locale::En);

        assert_eq!(*seen.borrow(), vec![Locale::ZhCn, Locale::En]);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("zh-Hans-CN"), Some(Locale::ZhCn));
        assert_eq!(Locale::from_tag("EN_us"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
    }
}
