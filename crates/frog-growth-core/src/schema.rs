//! Column-name constants and checkpoint schemas.

use polars::prelude::{DataType, Field, Schema};

pub const CAPTURE_CHECKPOINT: &str = "capture_join.csv";
pub const RELOCATION_CHECKPOINT: &str = "relocate_join.csv";
pub const FROG_GROWTH_OUTPUT: &str = "frog_growth.csv";

// ── Capture columns ─────────────────────────────────────────────────────────
pub mod capture {
    pub const SITE_ID: &str = "site_id";
    pub const VISIT_DATE: &str = "visit_date";
    pub const PIT_TAG_REF: &str = "pit_tag_ref";
    pub const TAG_NEW: &str = "tag_new";
    pub const CAPTURE_ANIMAL_STATE: &str = "capture_animal_state";
    pub const SEX: &str = "sex";
    pub const LENGTH: &str = "length";
    pub const WEIGHT: &str = "weight";

    pub const ALL: [&str; 8] = [
        SITE_ID,
        VISIT_DATE,
        PIT_TAG_REF,
        TAG_NEW,
        CAPTURE_ANIMAL_STATE,
        SEX,
        LENGTH,
        WEIGHT,
    ];
}

// ── Relocation columns ──────────────────────────────────────────────────────
pub mod relocation {
    pub const COLLECT_SITEID: &str = "collect_siteid";
    pub const COLLECT_SITEID1: &str = "collect_siteid1";
    pub const COLLECT_SITEID2: &str = "collect_siteid2";
    pub const COLLECT_SITEID3: &str = "collect_siteid3";
    pub const RELEASE_SITEID1: &str = "release_siteid1";
    pub const RELEASE_SITEID2: &str = "release_siteid2";
    pub const RELEASE_DATE: &str = "release_date";
    pub const TYPE: &str = "type";
    pub const PIT_TAG_REF: &str = "pit_tag_ref";

    pub const COLLECT_SPLIT: [&str; 3] = [COLLECT_SITEID1, COLLECT_SITEID2, COLLECT_SITEID3];

    pub const RAW: [&str; 6] = [
        COLLECT_SITEID,
        RELEASE_SITEID1,
        RELEASE_SITEID2,
        RELEASE_DATE,
        TYPE,
        PIT_TAG_REF,
    ];
}

// ── Site classification columns ─────────────────────────────────────────────
pub mod site {
    pub const SITE_ID: &str = "site_id";
    pub const POPULATION_TYPE: &str = "population_type";
}

// ── Frog growth output columns ──────────────────────────────────────────────
pub mod growth {
    pub const SITE_ID: &str = "site_id";
    pub const POPULATION_TYPE: &str = "population_type";
    pub const PIT_TAG_REF: &str = "pit_tag_ref";
    pub const CAPTURE_DATE: &str = "capture_date";
    pub const STATE: &str = "state";
    pub const SEX: &str = "sex";
    pub const LENGTH: &str = "length";
    pub const WEIGHT: &str = "weight";
    pub const FROG_TYPE: &str = "frog_type";

    pub const ALL: [&str; 9] = [
        SITE_ID,
        POPULATION_TYPE,
        PIT_TAG_REF,
        CAPTURE_DATE,
        STATE,
        SEX,
        LENGTH,
        WEIGHT,
        FROG_TYPE,
    ];
}

pub fn capture_schema() -> Schema {
    Schema::from_iter([
        Field::new(capture::SITE_ID.into(), DataType::Int32),
        Field::new(capture::VISIT_DATE.into(), DataType::Date),
        Field::new(capture::PIT_TAG_REF.into(), DataType::String),
        Field::new(capture::TAG_NEW.into(), DataType::Boolean),
        Field::new(capture::CAPTURE_ANIMAL_STATE.into(), DataType::String),
        Field::new(capture::SEX.into(), DataType::String),
        Field::new(capture::LENGTH.into(), DataType::Float64),
        Field::new(capture::WEIGHT.into(), DataType::Float64),
    ])
}

pub fn relocation_schema() -> Schema {
    Schema::from_iter([
        Field::new(relocation::COLLECT_SITEID.into(), DataType::String),
        Field::new(relocation::RELEASE_SITEID1.into(), DataType::Int32),
        Field::new(relocation::RELEASE_SITEID2.into(), DataType::Int32),
        Field::new(relocation::RELEASE_DATE.into(), DataType::Date),
        Field::new(relocation::TYPE.into(), DataType::String),
        Field::new(relocation::PIT_TAG_REF.into(), DataType::String),
    ])
}
