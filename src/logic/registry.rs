use crate::config::PaginationConfig;
use crate::error::CoreError;
use crate::model::{
    CompanionField, FieldDomain, FilterField, IdFormat, MutableField, ResourceDescriptor, SortDirection,
    ValueType,
};

pub const MEDIA_TYPES: &[&str] = &["movie", "tv_show", "tv_season", "unknown"];
pub const LABELS: &[&str] = &["would_watch", "would_not_watch"];
pub const REJECTION_STATUSES: &[&str] = &["unfiltered", "accepted", "rejected", "override"];
pub const PIPELINE_STATUSES: &[&str] = &[
    "ingested",
    "paused",
    "parsed",
    "rejected",
    "file_accepted",
    "metadata_collected",
    "media_accepted",
    "downloading",
    "downloaded",
    "transferred",
    "complete",
];
pub const CM_VALUES: &[&str] = &["tn", "tp", "fn", "fp"];

const RELEASE_YEARS: ValueType = ValueType::bounded(1850, 2100);

/// Immutable set of resource descriptors, built once at startup.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    descriptors: Vec<ResourceDescriptor>,
}

impl ResourceRegistry {
    /// Declare every resource against `schema`. The schema name is spliced
    /// into statement text, so it must be a plain identifier.
    pub fn new(pagination: &PaginationConfig, schema: &str) -> Result<Self, CoreError> {
        if !is_identifier(schema) {
            return Err(CoreError::invalid_parameter(
                "database.schema",
                format!("'{}' is not a valid schema name", schema),
            ));
        }
        if pagination.default_limit <= 0 || pagination.max_limit <= 0 || pagination.media_max_limit <= 0 {
            return Err(CoreError::invalid_parameter(
                "pagination",
                "limits must be greater than 0",
            ));
        }

        let table = |name: &str| format!("{}.{}", schema, name);
        let descriptors = vec![
            training(table("training"), pagination.max_limit),
            media(table("media"), pagination.media_max_limit),
            prediction(table("prediction"), pagination.max_limit),
            movies(table("movies"), pagination.max_limit),
            flyway(table("flyway_schema_history"), pagination.max_limit),
        ];

        Ok(Self { descriptors })
    }

    pub fn describe(&self, resource: &str) -> Result<&ResourceDescriptor, CoreError> {
        self.descriptors
            .iter()
            .find(|d| d.name == resource)
            .ok_or_else(|| CoreError::UnknownResource(resource.to_string()))
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.name)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn training(table: String, max_limit: i64) -> ResourceDescriptor {
    ResourceDescriptor {
        name: "training",
        table,
        primary_key: &["imdb_id"],
        id_field: "imdb_id",
        id_format: Some(IdFormat::ImdbId),
        filterable: vec![
            FilterField::new("media_type", ValueType::Enum(MEDIA_TYPES)),
            FilterField::new("label", ValueType::Enum(LABELS)),
            FilterField::new("reviewed", ValueType::Boolean),
            FilterField::new("human_labeled", ValueType::Boolean),
            FilterField::new("anomalous", ValueType::Boolean),
            FilterField::new("imdb_id", ValueType::String),
        ],
        sortable: &[
            "created_at",
            "updated_at",
            "media_title",
            "release_year",
            "media_type",
            "label",
            "imdb_id",
            "tmdb_id",
            "budget",
            "revenue",
            "runtime",
            "original_language",
            "tmdb_rating",
            "tmdb_votes",
            "rt_score",
            "metascore",
            "imdb_rating",
            "imdb_votes",
            "human_labeled",
            "anomalous",
            "reviewed",
        ],
        default_sort_field: "created_at",
        default_sort_direction: SortDirection::Desc,
        max_limit,
        mutable: vec![
            MutableField {
                segment: "label",
                column: "label",
                domain: FieldDomain::Enum(LABELS),
                side_effects: &[("human_labeled", true), ("reviewed", true)],
                companion: None,
                success_message: "Label updated successfully",
            },
            MutableField {
                segment: "reviewed",
                column: "reviewed",
                domain: FieldDomain::Boolean,
                side_effects: &[],
                companion: None,
                success_message: "Reviewed status updated successfully",
            },
        ],
    }
}

fn media(table: String, max_limit: i64) -> ResourceDescriptor {
    ResourceDescriptor {
        name: "media",
        table,
        primary_key: &["hash"],
        id_field: "hash",
        id_format: Some(IdFormat::Sha1Hex),
        filterable: vec![
            FilterField::new("media_type", ValueType::Enum(MEDIA_TYPES)),
            FilterField::new("pipeline_status", ValueType::Enum(PIPELINE_STATUSES)),
            FilterField::new("rejection_status", ValueType::Enum(REJECTION_STATUSES)),
            FilterField::new("error_status", ValueType::Boolean),
            FilterField::new("imdb_id", ValueType::String),
            FilterField::new("hash", ValueType::String),
            FilterField::new("media_title", ValueType::Search),
            FilterField::new("release_year", RELEASE_YEARS),
        ],
        sortable: &[
            "created_at",
            "updated_at",
            "release_year",
            "media_title",
            "imdb_rating",
        ],
        default_sort_field: "created_at",
        default_sort_direction: SortDirection::Desc,
        max_limit,
        mutable: vec![
            MutableField {
                segment: "rejection-status",
                column: "rejection_status",
                domain: FieldDomain::Enum(REJECTION_STATUSES),
                side_effects: &[],
                companion: None,
                success_message: "Rejection status updated successfully",
            },
            MutableField {
                segment: "pipeline-status",
                column: "pipeline_status",
                domain: FieldDomain::Enum(PIPELINE_STATUSES),
                side_effects: &[],
                companion: Some(CompanionField {
                    column: "error_status",
                    domain: FieldDomain::Boolean,
                }),
                success_message: "Pipeline status updated successfully",
            },
        ],
    }
}

fn prediction(table: String, max_limit: i64) -> ResourceDescriptor {
    ResourceDescriptor {
        name: "prediction",
        table,
        primary_key: &["imdb_id"],
        id_field: "imdb_id",
        id_format: Some(IdFormat::ImdbId),
        filterable: vec![
            FilterField::new("imdb_id", ValueType::String),
            FilterField::new("prediction", ValueType::bounded(0, 1)),
            FilterField::new("cm_value", ValueType::Enum(CM_VALUES)),
        ],
        sortable: &["imdb_id", "prediction", "probability", "cm_value", "created_at"],
        default_sort_field: "created_at",
        default_sort_direction: SortDirection::Desc,
        max_limit,
        mutable: vec![],
    }
}

/// Read-only view joining training and prediction rows per title.
fn movies(table: String, max_limit: i64) -> ResourceDescriptor {
    ResourceDescriptor {
        name: "movies",
        table,
        primary_key: &["imdb_id"],
        id_field: "imdb_id",
        id_format: Some(IdFormat::ImdbId),
        filterable: vec![
            FilterField::new("media_type", ValueType::Enum(MEDIA_TYPES)),
            FilterField::new("label", ValueType::Enum(LABELS)),
            FilterField::new("reviewed", ValueType::Boolean),
            FilterField::new("human_labeled", ValueType::Boolean),
            FilterField::new("anomalous", ValueType::Boolean),
            FilterField::new("prediction", ValueType::bounded(0, 1)),
            FilterField::new("cm_value", ValueType::Enum(CM_VALUES)),
            FilterField::new("imdb_id", ValueType::StringList),
            FilterField::new("media_title", ValueType::Search),
            FilterField::new("release_year", RELEASE_YEARS),
            FilterField::at_least("release_year_min", "release_year", RELEASE_YEARS),
            FilterField::at_most("release_year_max", "release_year", RELEASE_YEARS),
        ],
        sortable: &[
            "imdb_id",
            "tmdb_id",
            "label",
            "media_type",
            "media_title",
            "season",
            "episode",
            "release_year",
            "budget",
            "revenue",
            "runtime",
            "origin_country",
            "production_companies",
            "production_countries",
            "production_status",
            "original_language",
            "spoken_languages",
            "genre",
            "original_media_title",
            "tagline",
            "overview",
            "tmdb_rating",
            "tmdb_votes",
            "rt_score",
            "metascore",
            "imdb_rating",
            "imdb_votes",
            "human_labeled",
            "anomalous",
            "reviewed",
            "prediction",
            "probability",
            "cm_value",
            "training_created_at",
            "training_updated_at",
            "prediction_created_at",
        ],
        default_sort_field: "training_created_at",
        default_sort_direction: SortDirection::Desc,
        max_limit,
        mutable: vec![],
    }
}

fn flyway(table: String, max_limit: i64) -> ResourceDescriptor {
    ResourceDescriptor {
        name: "flyway",
        table,
        primary_key: &["installed_rank"],
        id_field: "installed_rank",
        id_format: None,
        filterable: vec![],
        sortable: &["installed_rank", "installed_on", "version"],
        default_sort_field: "installed_rank",
        default_sort_direction: SortDirection::Asc,
        max_limit,
        mutable: vec![],
    }
}
