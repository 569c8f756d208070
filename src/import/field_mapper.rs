// src/import/field_mapper.rs
//! Source column to designer field mapping

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::types::{FieldMapping, ImportRow, TargetField};
use crate::error::{ImportError, Result};

/// Canonical column names, matched after trim + lowercase.
const EXACT_MATCHES: &[(&str, TargetField)] = &[
    ("name", TargetField::Name),
    ("full name", TargetField::Name),
    ("full_name", TargetField::Name),
    ("fullname", TargetField::Name),
    ("title", TargetField::Title),
    ("job title", TargetField::Title),
    ("job_title", TargetField::Title),
    ("position", TargetField::Title),
    ("role", TargetField::Title),
    ("email", TargetField::Email),
    ("email address", TargetField::Email),
    ("e-mail", TargetField::Email),
    ("mail", TargetField::Email),
    ("level", TargetField::Level),
    ("seniority", TargetField::Level),
    ("seniority level", TargetField::Level),
    ("location", TargetField::Location),
    ("city", TargetField::Location),
    ("company", TargetField::Company),
    ("current company", TargetField::Company),
    ("employer", TargetField::Company),
    ("organization", TargetField::Company),
    ("linkedin", TargetField::LinkedinUrl),
    ("linkedin url", TargetField::LinkedinUrl),
    ("linkedin_url", TargetField::LinkedinUrl),
    ("linkedin profile", TargetField::LinkedinUrl),
    ("portfolio", TargetField::PortfolioUrl),
    ("portfolio url", TargetField::PortfolioUrl),
    ("portfolio_url", TargetField::PortfolioUrl),
    ("website", TargetField::PortfolioUrl),
    ("skills", TargetField::Skills),
    ("skill", TargetField::Skills),
    ("bio", TargetField::Bio),
    ("about", TargetField::Bio),
    ("summary", TargetField::Bio),
    ("phone", TargetField::Phone),
    ("phone number", TargetField::Phone),
    ("mobile", TargetField::Phone),
    ("years_experience", TargetField::YearsExperience),
    ("years of experience", TargetField::YearsExperience),
    ("experience", TargetField::YearsExperience),
];

/// Substring rules tried in order when no exact name matches.
/// The first rule with any matching needle wins; keep this order.
const SUBSTRING_RULES: &[(&[&str], TargetField)] = &[
    (&["name"], TargetField::Name),
    (&["title", "position", "role"], TargetField::Title),
    (&["email", "e-mail", "mail"], TargetField::Email),
    (&["level", "seniority"], TargetField::Level),
    (&["location", "city", "country"], TargetField::Location),
    (
        &["company", "employer", "organization", "organisation"],
        TargetField::Company,
    ),
    (&["linkedin"], TargetField::LinkedinUrl),
    (&["portfolio", "website", "url"], TargetField::PortfolioUrl),
    (&["skill"], TargetField::Skills),
    (&["bio", "about", "summary"], TargetField::Bio),
    (&["phone", "mobile"], TargetField::Phone),
    (&["experience", "years"], TargetField::YearsExperience),
];

/// Suggest a target field for one source column.
pub fn suggest_target(column: &str) -> Option<TargetField> {
    let normalized = column.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, field)) = EXACT_MATCHES.iter().find(|(name, _)| *name == normalized) {
        return Some(*field);
    }

    SUBSTRING_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| normalized.contains(n)))
        .map(|(_, field)| *field)
}

/// Mappings for one upload, one entry per distinct source column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMappingSet {
    mappings: Vec<FieldMapping>,
}

impl FieldMappingSet {
    /// Build suggested mappings for the given columns. Repeated columns are kept once.
    pub fn auto_map<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut set = Self::default();
        for column in columns {
            let column = column.as_ref();
            if set.get(column).is_none() {
                set.mappings
                    .push(FieldMapping::new(column, suggest_target(column)));
            }
        }
        set
    }

    /// Map (or unmap) a column. Unknown columns are appended.
    pub fn set(&mut self, column: &str, target: Option<TargetField>) {
        match self.mappings.iter_mut().find(|m| m.source_column == column) {
            Some(mapping) => mapping.target_field = target,
            None => self.mappings.push(FieldMapping::new(column, target)),
        }
    }

    /// Drop mappings whose column is not among `columns`, returning the dropped names.
    pub fn retain_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.mappings.retain(|m| {
            let known = columns.iter().any(|c| c.as_ref() == m.source_column);
            if !known {
                dropped.push(m.source_column.clone());
            }
            known
        });
        dropped
    }

    pub fn get(&self, column: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.source_column == column)
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn into_mappings(self) -> Vec<FieldMapping> {
        self.mappings
    }

    pub fn columns_for(&self, target: TargetField) -> Vec<&str> {
        self.mappings
            .iter()
            .filter(|m| m.target_field == Some(target))
            .map(|m| m.source_column.as_str())
            .collect()
    }

    /// Required fields with at least one mapped column.
    pub fn mapped_required_fields(&self) -> BTreeSet<TargetField> {
        self.mappings
            .iter()
            .filter_map(|m| m.target_field)
            .filter(|f| f.is_required())
            .collect()
    }

    pub fn missing_required_fields(&self) -> Vec<TargetField> {
        let mapped = self.mapped_required_fields();
        TargetField::REQUIRED
            .into_iter()
            .filter(|f| !mapped.contains(f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.mapped_required_fields().len() == TargetField::REQUIRED.len()
    }

    /// Gate for CSV submission.
    pub fn ensure_complete(&self) -> Result<()> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::IncompleteMapping(missing))
        }
    }

    /// Values of one row keyed by target field.
    ///
    /// When several columns map to the same field, the last mapped column wins.
    pub fn project_row(&self, row: &ImportRow) -> BTreeMap<TargetField, String> {
        let mut record = BTreeMap::new();
        for mapping in &self.mappings {
            if let (Some(target), Some(value)) =
                (mapping.target_field, row.get(&mapping.source_column))
            {
                record.insert(target, value.to_string());
            }
        }
        record
    }
}

impl From<Vec<FieldMapping>> for FieldMappingSet {
    fn from(mappings: Vec<FieldMapping>) -> Self {
        let mut set = Self::default();
        for mapping in mappings {
            set.set(&mapping.source_column, mapping.target_field);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins() {
        assert_eq!(suggest_target("Email"), Some(TargetField::Email));
        assert_eq!(suggest_target("  FULL NAME "), Some(TargetField::Name));
        assert_eq!(suggest_target("Position"), Some(TargetField::Title));
        assert_eq!(suggest_target("Email Address"), Some(TargetField::Email));
    }

    #[test]
    fn test_first_declared_rule_wins() {
        // Contains both "name" and "company"; the name rule is declared first
        assert_eq!(suggest_target("Company Name"), Some(TargetField::Name));
        // Contains "title" and "level"; title is declared before level
        assert_eq!(suggest_target("Title Level"), Some(TargetField::Title));
        // Contains "linkedin" and "url"; linkedin is declared before portfolio
        assert_eq!(suggest_target("LinkedIn Profile URL"), Some(TargetField::LinkedinUrl));
    }

    #[test]
    fn test_substring_rules() {
        assert_eq!(suggest_target("Work Email"), Some(TargetField::Email));
        assert_eq!(suggest_target("Current Job Title"), Some(TargetField::Title));
        assert_eq!(suggest_target("Design Seniority"), Some(TargetField::Level));
        assert_eq!(suggest_target("Country of residence"), Some(TargetField::Location));
        assert_eq!(suggest_target("Personal Website"), Some(TargetField::PortfolioUrl));
        assert_eq!(suggest_target("Top Skills"), Some(TargetField::Skills));
        assert_eq!(suggest_target("Mobile Phone"), Some(TargetField::Phone));
        assert_eq!(suggest_target("Total years"), Some(TargetField::YearsExperience));
    }

    #[test]
    fn test_unmatched_column() {
        assert_eq!(suggest_target("Favourite colour"), None);
        assert_eq!(suggest_target("   "), None);
    }

    #[test]
    fn test_auto_map_one_entry_per_column() {
        let set = FieldMappingSet::auto_map(&["Name", "Email", "Name", "Notes"]);
        assert_eq!(set.mappings().len(), 3);
        assert_eq!(set.get("Notes").unwrap().target_field, None);
    }

    #[test]
    fn test_completeness_gate() {
        let complete = FieldMappingSet::auto_map(&["Name", "Title", "Email", "Level"]);
        assert!(complete.is_complete());
        assert!(complete.ensure_complete().is_ok());

        for missing in TargetField::REQUIRED {
            let mut set = complete.clone();
            let column = set.columns_for(missing)[0].to_string();
            set.set(&column, None);
            assert!(!set.is_complete(), "{} should be required", missing);
            assert_eq!(set.missing_required_fields(), vec![missing]);
            assert!(matches!(
                set.ensure_complete(),
                Err(ImportError::IncompleteMapping(ref fields)) if fields == &vec![missing]
            ));
        }
    }

    #[test]
    fn test_optional_fields_do_not_affect_gate() {
        let mut set = FieldMappingSet::auto_map(&["Name", "Title", "Email", "Level", "Skills"]);
        set.set("Skills", None);
        assert!(set.is_complete());

        let partial = FieldMappingSet::auto_map(&["Name", "Skills", "Bio", "Phone"]);
        assert!(!partial.is_complete());
        assert_eq!(
            partial.mapped_required_fields().into_iter().collect::<Vec<_>>(),
            vec![TargetField::Name]
        );
    }

    #[test]
    fn test_manual_override() {
        let mut set = FieldMappingSet::auto_map(&["Nickname", "Title", "Email", "Level"]);
        assert_eq!(set.get("Nickname").unwrap().target_field, Some(TargetField::Name));
        set.set("Nickname", Some(TargetField::Bio));
        assert!(!set.is_complete());
        set.set("Legal Name", Some(TargetField::Name));
        assert!(set.is_complete());
        assert_eq!(set.mappings().len(), 5);
    }

    #[test]
    fn test_mappings_for_missing_columns_do_not_count() {
        let mut set = FieldMappingSet::from(vec![
            FieldMapping::new("A", Some(TargetField::Name)),
            FieldMapping::new("B", Some(TargetField::Title)),
            FieldMapping::new("C", Some(TargetField::Email)),
            FieldMapping::new("D", Some(TargetField::Level)),
        ]);
        assert!(set.is_complete());

        let dropped = set.retain_columns(&["Foo", "B"]);
        assert_eq!(dropped, vec!["A", "C", "D"]);
        assert_eq!(set.mappings().len(), 1);
        assert_eq!(
            set.missing_required_fields(),
            vec![TargetField::Name, TargetField::Email, TargetField::Level]
        );
    }

    #[test]
    fn test_duplicate_target_last_mapping_wins() {
        let set = FieldMapping::new("Primary Email", Some(TargetField::Email));
        let other = FieldMapping::new("Backup Email", Some(TargetField::Email));
        let set = FieldMappingSet::from(vec![set, other]);

        let mut row = ImportRow::new();
        row.insert("Primary Email", "a@example.com");
        row.insert("Backup Email", "b@example.com");

        let record = set.project_row(&row);
        assert_eq!(record.get(&TargetField::Email).map(String::as_str), Some("b@example.com"));
        assert_eq!(set.columns_for(TargetField::Email).len(), 2);
    }
}
