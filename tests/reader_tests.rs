//! Reader behavior through the public trait

mod support;

use readgo::errors::{is_invalid_input, is_permission};
use readgo::types::{FileType, ReadOptions, TreeOptions};
use readgo::{DefaultReader, SourceReader};
use support::Workspace;

fn fixture() -> Workspace {
    let ws = Workspace::new("testmod");
    ws.write(
        "pkg/util.go",
        "package pkg\n\n// Add adds\nfunc Add(a, b int) int {\n\treturn a + b // sum\n}\n",
    );
    ws.write("pkg/util_test.go", "package pkg\n");
    ws.write(
        "pkg/zz_generated.go",
        "// Code generated by tool. DO NOT EDIT.\n\npackage pkg\n",
    );
    ws.write("vendor/dep/dep.go", "package dep\n");
    ws.write("README.md", "# readme\n");
    ws
}

#[tokio::test]
async fn test_tree_filters_by_type_and_exclude() {
    let ws = fixture();
    let reader = DefaultReader::new(ws.path());

    let opts = TreeOptions::go_files().with_excludes(vec!["vendor".to_string()]);
    let tree = reader.get_file_tree(".", &opts).await.unwrap();
    let mut paths: Vec<&str> = tree.files().iter().map(|n| n.path.as_str()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec!["pkg/util.go", "pkg/util_test.go", "pkg/zz_generated.go"]
    );

    let tests = TreeOptions {
        file_types: FileType::Test,
        ..TreeOptions::default()
    };
    let files = reader.get_package_files("pkg", &tests).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "util_test.go");

    let generated = TreeOptions {
        file_types: FileType::Generated,
        ..TreeOptions::default()
    };
    let files = reader.get_package_files("pkg", &generated).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "zz_generated.go");
}

#[tokio::test]
async fn test_search_and_read() {
    let ws = fixture();
    let reader = DefaultReader::new(ws.path());

    let found = reader
        .search_files("util", &TreeOptions::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let stripped = reader
        .read_source_file(
            "pkg/util.go",
            &ReadOptions {
                include_comments: false,
                strip_spaces: true,
            },
        )
        .await
        .unwrap();
    let text = String::from_utf8(stripped).unwrap();
    assert!(!text.contains("// Add adds"));
    assert!(!text.contains("// sum"));
    assert!(text.contains("return a + b"));
    assert!(!text.contains('\t'));

    let content = reader.read_file_with_functions("pkg/util.go").await.unwrap();
    assert_eq!(content.functions.len(), 1);
    assert_eq!(content.functions[0].name, "Add");
    assert_eq!(content.functions[0].start_line, 4);
    assert_eq!(content.functions[0].end_line, 6);
}

#[tokio::test]
async fn test_reads_are_confined() {
    let ws = fixture();
    let reader = DefaultReader::new(ws.path().join("pkg"));

    let err = reader.read_file("../README.md").await.unwrap_err();
    assert!(is_permission(&err));

    let err = reader
        .search_files("", &TreeOptions::default())
        .await
        .unwrap_err();
    assert!(is_invalid_input(&err));
}
