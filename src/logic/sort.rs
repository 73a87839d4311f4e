use crate::model::{ResourceDescriptor, SortDirection, SortSpec};

/// Resolve the requested ordering. Unknown fields and directions fall back
/// to the descriptor defaults without an error. Primary-key columns are
/// appended as tiebreakers so equal sort keys page deterministically.
pub fn resolve_sort(descriptor: &ResourceDescriptor, sort_by: Option<&str>, sort_order: Option<&str>) -> SortSpec {
    let field = sort_by
        .and_then(|f| descriptor.sortable_field(f))
        .unwrap_or(descriptor.default_sort_field);
    let direction = sort_order
        .and_then(SortDirection::parse)
        .unwrap_or(descriptor.default_sort_direction);
    let tiebreak = descriptor
        .primary_key
        .iter()
        .copied()
        .filter(|pk| *pk != field)
        .collect();

    SortSpec {
        field,
        direction,
        tiebreak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::logic::ResourceRegistry;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(&PaginationConfig::default(), "atp").unwrap()
    }

    #[test]
    fn honours_valid_requests() {
        let registry = registry();
        let sort = resolve_sort(registry.describe("training").unwrap(), Some("updated_at"), Some("ASC"));
        assert_eq!(sort.field, "updated_at");
        assert_eq!(sort.direction, SortDirection::Asc);
        assert_eq!(sort.tiebreak, vec!["imdb_id"]);
    }

    #[test]
    fn unknown_field_falls_back_to_default() {
        let registry = registry();
        let media = registry.describe("media").unwrap();
        let sort = resolve_sort(media, Some("hash; DROP TABLE media"), Some("asc"));
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = resolve_sort(media, None, None);
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn unknown_direction_falls_back_to_default() {
        let registry = registry();
        let flyway = registry.describe("flyway").unwrap();
        for order in ["up", "ascending", "", "random()"] {
            let sort = resolve_sort(flyway, Some("version"), Some(order));
            assert_eq!(sort.field, "version");
            assert_eq!(sort.direction, SortDirection::Asc);
        }
    }

    #[test]
    fn no_tiebreak_when_sorting_by_the_key() {
        let registry = registry();
        let sort = resolve_sort(registry.describe("prediction").unwrap(), Some("imdb_id"), Some("desc"));
        assert!(sort.tiebreak.is_empty());
    }
}
