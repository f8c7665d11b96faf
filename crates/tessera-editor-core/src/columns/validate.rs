//! Nesting and count checks for column layouts.

use crate::config::ColumnsConfig;
use crate::document::Document;
use crate::node::NodeType;

use super::ColumnsError;

/// Outcome of a validation. Never an `Err`: the caller decides what to do.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnValidation {
    pub valid: bool,
    pub error: Option<ColumnsError>,
}

impl ColumnValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: ColumnsError) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }

    /// Localized message for a rejection.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ColumnsError::message)
    }

    pub fn into_result(self) -> Result<(), ColumnsError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Whether any ancestor of `pos` is a column.
///
/// Positions outside the document count as not inside.
pub fn is_inside_column(doc: &Document, pos: usize) -> bool {
    let Ok(rp) = doc.resolve(pos) else {
        return false;
    };
    rp.ancestors().any(|(_, node)| node.is(NodeType::Column))
}

/// Whether a columns container may be created at `pos`.
pub fn can_create_columns(doc: &Document, pos: usize) -> ColumnValidation {
    if is_inside_column(doc, pos) {
        tracing::debug!(target: "tessera::columns", pos, "rejected: nested columns");
        return ColumnValidation::rejected(ColumnsError::Nested);
    }
    ColumnValidation::ok()
}

/// Whether a container may hold `count` columns.
pub fn validate_count(count: usize, config: &ColumnsConfig) -> ColumnValidation {
    if count < config.min_columns || count > config.max_columns {
        return ColumnValidation::rejected(ColumnsError::Count {
            count,
            min: config.min_columns,
            max: config.max_columns,
        });
    }
    ColumnValidation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn sample() -> Document {
        // 0 <p>1 a 2</p>3 <columns>4 <column>5 <p>6 b 7</p>8 </column>9 <column>10 <p>11 c 12</p>13 </column>14 </columns>15
        Document::new(Node::doc(vec![
            Node::paragraph("a"),
            Node::columns(vec![vec![Node::paragraph("b")], vec![Node::paragraph("c")]]),
        ]))
        .unwrap()
    }

    #[test]
    fn test_top_level_is_valid() {
        let doc = sample();
        assert!(can_create_columns(&doc, 1).valid);
        assert!(can_create_columns(&doc, 3).valid);
        assert!(!is_inside_column(&doc, 4));
    }

    #[test]
    fn test_inside_column_is_rejected() {
        let doc = sample();
        let result = can_create_columns(&doc, 6);
        assert!(!result.valid);
        assert_eq!(result.error, Some(ColumnsError::Nested));
        assert!(is_inside_column(&doc, 5));
        assert!(is_inside_column(&doc, 11));
    }

    #[test]
    fn test_out_of_range_is_not_inside() {
        assert!(!is_inside_column(&sample(), 99));
    }

    #[test]
    fn test_count_bounds() {
        let config = ColumnsConfig::default();
        assert!(validate_count(2, &config).valid);
        assert!(validate_count(7, &config).valid);
        assert!(!validate_count(1, &config).valid);
        let over = validate_count(8, &config);
        assert_eq!(
            over.error,
            Some(ColumnsError::Count {
                count: 8,
                min: 2,
                max: 7
            })
        );
        assert!(over.message().is_some());
    }
}
