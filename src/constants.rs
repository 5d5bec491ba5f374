/// Template ids, also used as route names
pub const SCHOOL_SHOOTINGS_TEMPLATE: &str = "wikipedia-school-shootings";
pub const MASS_SHOOTINGS_PRE_2018_TEMPLATE: &str = "wikipedia-mass-shootings-pre-2018";
pub const MASS_SHOOTINGS_2018_TEMPLATE: &str = "wikipedia-mass-shootings-2018";
pub const MASS_SHOOTINGS_2019_TEMPLATE: &str = "wikipedia-mass-shootings-2019";

// Root keys the extractor nests the row sequence under
pub const SCHOOL_SHOOTINGS_ROOT: &str = "school_shootings";
pub const MASS_SHOOTINGS_PRE_2018_ROOT: &str = "mass_shootings_pre_2018";
pub const MASS_SHOOTINGS_2018_ROOT: &str = "mass_shootings_2018";
pub const MASS_SHOOTINGS_2019_ROOT: &str = "mass_shootings_2019";

// Source pages
pub const SCHOOL_SHOOTINGS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_school_shootings_in_the_United_States";
pub const MASS_SHOOTINGS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_mass_shootings_in_the_United_States";
pub const MASS_SHOOTINGS_2018_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_mass_shootings_in_the_United_States_in_2018";
pub const MASS_SHOOTINGS_2019_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_mass_shootings_in_the_United_States_in_2019";

// Page shape shared by every wikipedia list template
pub const WIKIPEDIA_CONTAINER_SELECTOR: &str = "#bodyContent";
pub const WIKITABLE_ROW_SELECTOR: &str = ".wikitable tbody tr";

/// Rows of the pre-2018 list must resolve strictly before this instant.
pub const PRE_2018_BOUNDARY_TEXT: &str = "January 1, 2018 12:00 am";

// Raw row field names
pub const FIELD_DATE: &str = "date";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_DEATHS: &str = "deaths";
pub const FIELD_INJURIES: &str = "injuries";
pub const FIELD_DESCRIPTION: &str = "description";

// Fields only the pipeline writes
pub const FIELD_PERPETRATOR_DIED: &str = "perpetrator_died";
pub const FIELD_PERPETRATOR_INJURED: &str = "perpetrator_injured";
pub const FIELD_GEOCODE_RESULTS: &str = "geocode_results";

/// Google-style geocode endpoint served by the Data Science Toolkit
pub const DEFAULT_GEOCODER_URL: &str = "http://www.datasciencetoolkit.org/maps/api/geocode/json";

/// Get all template ids in declaration order
pub fn get_supported_templates() -> Vec<&'static str> {
    vec![
        SCHOOL_SHOOTINGS_TEMPLATE,
        MASS_SHOOTINGS_PRE_2018_TEMPLATE,
        MASS_SHOOTINGS_2018_TEMPLATE,
        MASS_SHOOTINGS_2019_TEMPLATE,
    ]
}
