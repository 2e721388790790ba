/// Extension-based file classification.
///
/// This module maps a file name to a category label using an ordered table of
/// categories, each owning a set of extensions. The table order is the match
/// priority: when two categories list the same extension, the one declared
/// first wins.
///
/// # Examples
///
/// ```
/// use tidydesk::classifier::{CategoryRules, OTHER_CATEGORY};
///
/// let rules = CategoryRules::new()
///     .with_category("Documents", [".txt", ".pdf"])
///     .with_category("Images", ["jpg", "PNG"]);
///
/// assert_eq!(rules.classify("report.PDF"), "Documents");
/// assert_eq!(rules.classify("photo.png"), "Images");
/// assert_eq!(rules.classify("Makefile"), OTHER_CATEGORY);
/// ```
use std::collections::HashSet;

/// Label returned for files no category claims.
pub const OTHER_CATEGORY: &str = "Other";

/// A named bucket of extensions.
///
/// Extensions are stored lowercase with their leading `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category, normalizing every extension.
    ///
    /// Entries that are empty after trimming are dropped.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// The category label, also used as the destination folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `extension` (already normalized) belongs to this category.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Number of extensions in this category.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true if the category owns no extension.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Ordered category table.
///
/// Iteration order is declaration order and determines tie-break priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRules {
    categories: Vec<Category>,
}

impl CategoryRules {
    /// Creates an empty table. Every file classifies as [`OTHER_CATEGORY`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category at the lowest priority.
    pub fn with_category<I, S>(mut self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push(Category::new(name, extensions));
        self
    }

    /// Appends an already-built category at the lowest priority.
    pub fn push(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// Categories in priority order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns the label of the first category containing the file's extension.
    pub fn classify(&self, file_name: &str) -> &str {
        classify(file_name, self)
    }
}

impl FromIterator<Category> for CategoryRules {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

/// Maps a file name to its category label.
///
/// The extension is everything from the last `.` to the end of the name,
/// lowercased; a name without `.` has the empty extension and therefore
/// always lands in [`OTHER_CATEGORY`].
pub fn classify<'r>(file_name: &str, rules: &'r CategoryRules) -> &'r str {
    let extension = extension_of(file_name);
    if extension.is_empty() {
        return OTHER_CATEGORY;
    }

    rules
        .categories
        .iter()
        .find(|category| category.contains(&extension))
        .map(Category::name)
        .unwrap_or(OTHER_CATEGORY)
}

/// Extracts the lowercase extension (leading `.` included) of a file name.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|idx| file_name[idx..].to_lowercase())
        .unwrap_or_default()
}

/// Lowercases an extension and prefixes it with `.` when missing.
fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> CategoryRules {
        CategoryRules::new()
            .with_category("Documents", [".txt", ".pdf"])
            .with_category("Images", [".jpg", ".png"])
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt"), ".txt");
        assert_eq!(extension_of("archive.tar.GZ"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".DS_Store"), ".ds_store");
        assert_eq!(extension_of("trailing."), ".");
    }

    #[test]
    fn test_classify_known_extensions() {
        let rules = sample_rules();
        assert_eq!(classify("a.txt", &rules), "Documents");
        assert_eq!(classify("b.pdf", &rules), "Documents");
        assert_eq!(classify("c.jpg", &rules), "Images");
        assert_eq!(classify("d.png", &rules), "Images");
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let rules = sample_rules();
        assert_eq!(classify("SCAN.PDF", &rules), "Documents");
        assert_eq!(classify("Holiday.JpG", &rules), "Images");
    }

    #[test]
    fn test_classify_unknown_or_missing_extension() {
        let rules = sample_rules();
        assert_eq!(classify("e.xyz", &rules), OTHER_CATEGORY);
        assert_eq!(classify("Makefile", &rules), OTHER_CATEGORY);
        assert_eq!(classify("trailing.", &rules), OTHER_CATEGORY);
        assert_eq!(classify("", &rules), OTHER_CATEGORY);
    }

    #[test]
    fn test_first_match_wins() {
        let rules = CategoryRules::new()
            .with_category("Code", [".ts"])
            .with_category("Videos", [".ts", ".mp4"]);
        assert_eq!(classify("main.ts", &rules), "Code");
        assert_eq!(classify("clip.mp4", &rules), "Videos");

        let reversed = CategoryRules::new()
            .with_category("Videos", [".ts", ".mp4"])
            .with_category("Code", [".ts"]);
        assert_eq!(classify("main.ts", &reversed), "Videos");
    }

    #[test]
    fn test_empty_rules_yield_other() {
        let rules = CategoryRules::new();
        assert!(rules.is_empty());
        assert_eq!(rules.classify("a.txt"), OTHER_CATEGORY);
    }

    #[test]
    fn test_category_normalizes_extensions() {
        let category = Category::new("Images", ["JPG", " .Png ", "", "."]);
        assert_eq!(category.len(), 2);
        assert!(category.contains(".jpg"));
        assert!(category.contains(".png"));
        assert!(!category.contains("jpg"));
    }

    #[test]
    fn test_classify_with_dotted_name_uses_last_segment() {
        let rules = sample_rules();
        assert_eq!(classify("notes.txt.jpg", &rules), "Images");
        assert_eq!(classify("photo.jpg.bak", &rules), OTHER_CATEGORY);
    }
}
