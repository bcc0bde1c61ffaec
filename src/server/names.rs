use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static CF_QUALIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcf\.\s*").expect("valid pattern"));
static SP_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\bspp?\.\s*\d*(?:\s*-\s*spp?\.\s*\d*)?\s*$").expect("valid pattern")
});
static EXTRA_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid pattern"));

/// Strips survey qualifiers from a scientific name before taxon lookup.
///
/// Occurrence data carries field notation such as `cf.` (uncertain
/// identification) and `sp.`/`spp.` placeholders, sometimes with index
/// ranges. Taxon search wants the bare binomial or genus.
pub fn clean_scientific_name(raw: &str) -> String {
    let name = CF_QUALIFIER.replace_all(raw, "");
    let name = SP_SUFFIX.replace(&name, "");
    let name = EXTRA_SPACE.replace_all(name.trim(), " ").into_owned();

    if name != raw {
        trace!(original_name = raw, normalized_name = %name, "Normalized name");
    }

    name
}
