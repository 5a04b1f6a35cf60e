use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a document store with two categories, a nested archive, a root-level
/// document and some files that must stay invisible.
pub fn create_test_store() -> TempDir {
    let dir = TempDir::new().unwrap();

    fs::create_dir(dir.path().join("products")).unwrap();
    write_doc(
        dir.path().join("products"),
        "pricing.txt",
        "Pricing overview\nprice: $10\nContact sales for volume discounts.\n",
    );
    write_doc(
        dir.path().join("products"),
        "features.txt",
        "Features\nOffline mode\nShared workspaces\n",
    );
    write_doc(dir.path().join("products"), "roadmap.md", "draft roadmap");

    fs::create_dir(dir.path().join("policies")).unwrap();
    write_doc(
        dir.path().join("policies"),
        "refunds.txt",
        "Refund policy\nRefunds are issued within 30 days.\n",
    );

    fs::create_dir_all(dir.path().join("policies/archive")).unwrap();
    write_doc(
        dir.path().join("policies/archive"),
        "old-refunds.txt",
        "Legacy refund policy\n",
    );

    fs::create_dir(dir.path().join("images")).unwrap();
    write_doc(dir.path().join("images"), "banner.png", "draft banner");

    write_doc(dir.path(), "readme.txt", "Legacy readme at the root\n");

    dir
}

fn write_doc(dir: impl AsRef<Path>, name: &str, content: &str) {
    fs::write(dir.as_ref().join(name), content).unwrap();
}
