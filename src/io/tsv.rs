//! TSV Serializing helpers, functionality, etc.

use crate::traits::TsvSerialize;
use lazy_static::lazy_static;

lazy_static! {
    /// The standard BED format TSV configuration.
    pub static ref BED_TSV: TsvConfig = TsvConfig {
        no_value_string: ".".to_string(),
    };
}

/// This is an extensible type to handle common
/// TSV output configurations, e.g. what to print
/// for an empty pass-through field.
pub struct TsvConfig {
    pub no_value_string: String,
}

impl TsvSerialize for &String {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        if self.is_empty() {
            config.no_value_string.clone()
        } else {
            self.to_string()
        }
    }
}

impl TsvSerialize for String {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        (&self).to_tsv(config)
    }
}

impl<U: TsvSerialize> TsvSerialize for Vec<U> {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        self.iter()
            .map(|x| x.to_tsv(config))
            .collect::<Vec<_>>()
            .join("\t")
    }
}
