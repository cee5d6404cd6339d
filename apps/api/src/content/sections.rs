//! The static section registry: one `SectionConfig` per résumé section.
//! The reconciler is written once and parameterized entirely from here.

use serde_json::Value;

use crate::models::sections as defaults;
use crate::store::Bucket;

/// Where a section's authoritative content lives in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// One row per item in a dedicated table.
    Rows { table: &'static str },
    /// One serialized-array row in `portfolio_content`, keyed by content type.
    Keyed { content_key: &'static str },
}

/// Where "add" places new items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrder {
    Append,
    Prepend,
}

/// Classes of binary attachment a section accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Document,
    Image,
}

impl AssetKind {
    pub fn accepts(self, ext: &str) -> bool {
        match self {
            AssetKind::Document => matches!(ext, "pdf" | "doc" | "docx"),
            AssetKind::Image => matches!(
                ext,
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp" | "avif"
            ),
        }
    }
}

/// Attachment policy: which file classes a section accepts and which bucket
/// each class lands in.
#[derive(Debug, Clone, Copy)]
pub struct AssetPolicy {
    pub classes: &'static [(AssetKind, Bucket)],
}

impl AssetPolicy {
    /// Bucket for an uploaded extension, or None when the extension is not
    /// allow-listed for this section.
    pub fn bucket_for(&self, ext: &str) -> Option<Bucket> {
        self.classes
            .iter()
            .find(|(kind, _)| kind.accepts(ext))
            .map(|(_, bucket)| *bucket)
    }

    pub fn bucket_for_key(&self, key: &str) -> Option<Bucket> {
        crate::store::extension_of(key).and_then(|ext| self.bucket_for(&ext))
    }

    pub fn primary_bucket(&self) -> Bucket {
        self.classes[0].1
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.classes.iter().map(|(_, bucket)| *bucket)
    }
}

/// Full per-section configuration for the generic reconciler.
pub struct SectionConfig {
    pub key: &'static str,
    pub storage: StorageMode,
    pub insert: InsertOrder,
    /// Display fields that must be non-empty for add/edit.
    pub required: &'static [&'static str],
    pub asset: Option<AssetPolicy>,
    pub defaults: fn() -> Vec<Value>,
}

const DOCUMENTS_POLICY: AssetPolicy = AssetPolicy {
    classes: &[
        (AssetKind::Document, Bucket::Documents),
        (AssetKind::Image, Bucket::Documents),
    ],
};

const CERTIFICATION_POLICY: AssetPolicy = AssetPolicy {
    classes: &[
        (AssetKind::Document, Bucket::CertificationDocuments),
        (AssetKind::Image, Bucket::CertificationDocuments),
    ],
};

const CONTACT_POLICY: AssetPolicy = AssetPolicy {
    classes: &[
        (AssetKind::Image, Bucket::ContactImages),
        (AssetKind::Document, Bucket::Documents),
    ],
};

const PROFILE_IMAGE_POLICY: AssetPolicy = AssetPolicy {
    classes: &[(AssetKind::Image, Bucket::ProfileImages)],
};

pub static SECTIONS: &[SectionConfig] = &[
    SectionConfig {
        key: "about",
        storage: StorageMode::Keyed {
            content_key: "about",
        },
        insert: InsertOrder::Append,
        required: &["text"],
        asset: Some(PROFILE_IMAGE_POLICY),
        defaults: defaults::default_about,
    },
    SectionConfig {
        key: "education",
        storage: StorageMode::Keyed {
            content_key: "education",
        },
        insert: InsertOrder::Append,
        required: &["institution", "degree"],
        asset: Some(DOCUMENTS_POLICY),
        defaults: defaults::default_education,
    },
    SectionConfig {
        key: "certifications",
        storage: StorageMode::Rows {
            table: "certifications",
        },
        insert: InsertOrder::Append,
        required: &["name", "issuer"],
        asset: Some(CERTIFICATION_POLICY),
        defaults: defaults::default_certifications,
    },
    SectionConfig {
        key: "skills",
        storage: StorageMode::Keyed {
            content_key: "skills",
        },
        insert: InsertOrder::Append,
        required: &["name"],
        asset: None,
        defaults: defaults::default_skills,
    },
    SectionConfig {
        key: "experience",
        storage: StorageMode::Keyed {
            content_key: "experience",
        },
        // The timeline renders newest-first, so new entries go on top.
        insert: InsertOrder::Prepend,
        required: &["title", "company"],
        asset: None,
        defaults: defaults::default_experience,
    },
    SectionConfig {
        key: "projects",
        storage: StorageMode::Keyed {
            content_key: "projects",
        },
        insert: InsertOrder::Append,
        required: &["name", "description"],
        asset: None,
        defaults: defaults::default_projects,
    },
    SectionConfig {
        key: "contact",
        storage: StorageMode::Keyed {
            content_key: "contact",
        },
        insert: InsertOrder::Append,
        required: &["label", "value"],
        asset: Some(CONTACT_POLICY),
        defaults: defaults::default_contact,
    },
];

pub fn section(key: &str) -> Option<&'static SectionConfig> {
    SECTIONS.iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_seven_sections_registered() {
        let keys: Vec<_> = SECTIONS.iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                "about",
                "education",
                "certifications",
                "skills",
                "experience",
                "projects",
                "contact"
            ]
        );
    }

    #[test]
    fn test_section_lookup() {
        assert!(section("certifications").is_some());
        assert!(section("hero").is_none());
    }

    #[test]
    fn test_certifications_accept_pdf_and_images() {
        let policy = section("certifications").unwrap().asset.unwrap();
        assert_eq!(policy.bucket_for("pdf"), Some(Bucket::CertificationDocuments));
        assert_eq!(policy.bucket_for("png"), Some(Bucket::CertificationDocuments));
        assert_eq!(policy.bucket_for("exe"), None);
    }

    #[test]
    fn test_contact_routes_classes_to_buckets() {
        let policy = section("contact").unwrap().asset.unwrap();
        assert_eq!(policy.bucket_for("jpg"), Some(Bucket::ContactImages));
        assert_eq!(policy.bucket_for("pdf"), Some(Bucket::Documents));
        assert_eq!(policy.bucket_for_key("contact/cv-12.pdf"), Some(Bucket::Documents));
    }

    #[test]
    fn test_skill_sections_take_no_attachments() {
        assert!(section("skills").unwrap().asset.is_none());
        assert!(section("experience").unwrap().asset.is_none());
        assert!(section("projects").unwrap().asset.is_none());
    }

    #[test]
    fn test_experience_prepends_everything_else_appends() {
        for config in SECTIONS {
            let expected = if config.key == "experience" {
                InsertOrder::Prepend
            } else {
                InsertOrder::Append
            };
            assert_eq!(config.insert, expected, "section {}", config.key);
        }
    }
}
