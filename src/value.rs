//! Conversions from the generator's types into template [`Value`]s. Every
//! struct becomes a [`Value::Object`] keyed by the capitalized field names the
//! templates use (`.Site.Name`, `.Page.Data.Events`, ...).

use crate::event::{EventGroup, PastEvents};
use crate::write::{Page, Site};
use gtmpl::Value;
use std::collections::HashMap;

impl From<&Site<'_>> for Value {
    fn from(s: &Site) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Name".to_owned(), Value::String(s.config.name.clone()));
        m.insert("Description".to_owned(), Value::String(s.config.description.clone()));
        Value::Object(m)
    }
}

impl From<&Page> for Value {
    fn from(p: &Page) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Name".to_owned(), Value::String(p.name.clone()));
        m.insert("Data".to_owned(), p.data.clone());
        Value::Object(m)
    }
}

impl From<&EventGroup> for Value {
    fn from(eg: &EventGroup) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Year".to_owned(), Value::String(eg.year.clone()));
        m.insert("Events".to_owned(), Value::String(eg.events.clone()));
        m.insert("Resources".to_owned(), Value::String(eg.resources.clone()));
        Value::Object(m)
    }
}

impl From<&PastEvents> for Value {
    /// The past-events pages see the year groups in order (`.Years`) and the
    /// resources of every year together (`.Resources`).
    fn from(pe: &PastEvents) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "Years".to_owned(),
            Value::Array(pe.years.iter().map(Value::from).collect()),
        );
        m.insert("Resources".to_owned(), Value::String(pe.resources.clone()));
        Value::Object(m)
    }
}

/// Builds the `{Site, Page}` context a page is rendered with.
pub fn page_context(site: &Site, page: &Page) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Site".to_owned(), site.into());
    m.insert("Page".to_owned(), page.into());
    Value::Object(m)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SiteConfig;
    use crate::output::MemoryOutput;
    use crate::source::MemorySource;
    use std::path::Path;

    #[test]
    fn test_site_value_reads_config() {
        let source = MemorySource::new();
        let output = MemoryOutput::new();
        let config = SiteConfig {
            name: String::from("Test Forum"),
            description: String::from("A test"),
            ..SiteConfig::default()
        };
        let site = Site::new(config, Path::new("site"), &source, &output);

        let mut want: HashMap<String, Value> = HashMap::new();
        want.insert("Name".to_owned(), Value::String("Test Forum".to_owned()));
        want.insert("Description".to_owned(), Value::String("A test".to_owned()));
        match Value::from(&site) {
            Value::Object(got) => assert_eq!(want, got),
            other => panic!("expected an object, got {:?}", other),
        }
    }
}
