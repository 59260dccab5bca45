use ocurrent_site::commands::{init::init_site, new::create_example};
use ocurrent_site::content::ContentLoader;
use ocurrent_site::generator::materialize;
use ocurrent_site::Site;
use std::fs;
use tempfile::TempDir;

#[test]
fn scaffold_add_example_and_build() {
    let dir = TempDir::new().unwrap();
    init_site(dir.path()).unwrap();

    let site = Site::new(dir.path()).unwrap();
    let created = create_example(&site, "Second step").unwrap();
    assert!(created.ends_with("examples/02-second-step.md"));

    let examples = ContentLoader::new(&site)
        .load_index()
        .unwrap()
        .examples()
        .unwrap();
    let indices: Vec<_> = examples.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2]);

    let routes = materialize(&examples).unwrap();
    assert_eq!(routes.len(), 3 + examples.len());

    site.generate().unwrap();
    let page = fs::read_to_string(site.public_dir.join("tutorial/02/index.html")).unwrap();
    assert!(page.contains("<h1>Second step</h1>"));

    let listing = fs::read_to_string(site.public_dir.join("examples/index.html")).unwrap();
    assert!(listing.contains(r#"<div class="example-panel-index">2</div>"#));

    site.clean().unwrap();
    assert!(!site.public_dir.exists());
}
