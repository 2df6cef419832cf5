/* 📖 # PAL behaviour shared by both implementations
The same scenarios run against MockPal and a RealPal rooted in a temp directory,
so engine tests written against MockPal stay meaningful on disk.
*/

#[cfg(test)]
mod shared_behaviour_tests {
    use crate::pal::{FilePath, MockPal, PalHandle, RealPal};
    use tempfile::TempDir;

    fn implementations() -> Vec<(&'static str, PalHandle, Option<TempDir>)> {
        let temp_dir = TempDir::new().unwrap();
        let real = PalHandle::new(RealPal::new(temp_dir.path().to_path_buf()));
        vec![
            ("mock", PalHandle::new(MockPal::new()), None),
            ("real", real, Some(temp_dir)),
        ]
    }

    fn sorted_walk(pal: &PalHandle, root: &str, globs: &[&str]) -> Vec<String> {
        let globs: Vec<String> = globs.iter().map(|glob| glob.to_string()).collect();
        let mut paths: Vec<String> = pal
            .walk_directory(&FilePath::from(root), &globs)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .into_iter()
            .map(|path| path.to_string())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_site_tree_roundtrip() {
        for (name, pal, _guard) in implementations() {
            pal.write_file(&FilePath::from("clean_site/index.html"), b"home")
                .unwrap();
            pal.write_file(&FilePath::from("clean_site/austin/index.html"), b"austin")
                .unwrap();
            pal.write_file(&FilePath::from("clean_site/robots.txt"), b"User-agent: *")
                .unwrap();

            assert!(pal.file_exists(&FilePath::from("clean_site/austin")).unwrap(), "{name}");
            assert_eq!(
                pal.read_file_to_string(&FilePath::from("clean_site/austin/index.html"))
                    .unwrap(),
                "austin",
                "{name}"
            );
            assert_eq!(
                sorted_walk(&pal, "clean_site", &["*.html"]),
                ["clean_site/austin/index.html", "clean_site/index.html"],
                "{name}"
            );
            assert_eq!(
                sorted_walk(&pal, "clean_site", &["*.txt", "*.html"]).len(),
                3,
                "{name}"
            );
        }
    }

    #[test]
    fn test_missing_things_are_errors() {
        for (name, pal, _guard) in implementations() {
            assert!(!pal.file_exists(&FilePath::from("missing.html")).unwrap(), "{name}");
            assert!(pal.read_file(&FilePath::from("missing.html")).is_err(), "{name}");
            assert!(pal.modified_time(&FilePath::from("missing.html")).is_err(), "{name}");
            assert!(
                pal.walk_directory(&FilePath::from("missing"), &["*".to_string()])
                    .is_err(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_overwrite_replaces_content() {
        for (name, pal, _guard) in implementations() {
            let path = FilePath::from("scraped_businesses.json");
            pal.write_file(&path, b"{\"a\": 1, \"b\": 2}").unwrap();
            pal.write_file(&path, b"{}").unwrap();
            assert_eq!(pal.read_file_to_string(&path).unwrap(), "{}", "{name}");
        }
    }
}
