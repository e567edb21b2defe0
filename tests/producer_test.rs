#[cfg(test)]
mod producer {
    use std::path::Path;
    use std::process::Command;
    use std::sync::Arc;

    use inmo::config::{create_test_config, Config};
    use inmo::models::property::{Money, Property, PropertyType, TransactionType};
    use inmo::producer::admin::{AdminService, SyncStatus};
    use inmo::producer::git::{GitSync, SyncOutcome, SyncStage};
    use inmo::producer::images::ImageProcessor;
    use inmo::producer::repository::PropertyRepository;
    use inmo::store::{JsonFileStore, LocalState, StateStore};

    fn sample_property(id: &str) -> Property {
        Property {
            id: id.to_string(),
            property_type: PropertyType::Casa,
            transaction: TransactionType::Venta,
            address: "Av. Las Delicias".to_string(),
            money: Money::Dollar,
            price: 65000.0,
            square_meters: 150.0,
            land_square_meters: None,
            bedrooms: 3,
            bathrooms: 2,
            parking_spaces: Some(1),
            description: Some("Casa con patio".to_string()),
            image: Vec::new(),
            construction_year: None,
            condition: None,
            amenities: None,
            coordinate: None,
            lat: None,
            lng: None,
            phone_contact: None,
            storage_room: None,
        }
    }

    #[test]
    fn repository_reads_a_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));
        assert!(repository.get_all().unwrap().is_empty());
    }

    #[test]
    fn repository_add_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));

        repository.add(sample_property("A-000001")).unwrap();
        repository.add(sample_property("A-000002")).unwrap();

        let all = repository.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "A-000001");
    }

    #[test]
    fn repository_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));

        repository.add(sample_property("A-000001")).unwrap();
        assert!(repository.add(sample_property("A-000001")).is_err());
        assert_eq!(repository.get_all().unwrap().len(), 1);
    }

    #[test]
    fn repository_update_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));

        repository.add(sample_property("A-000001")).unwrap();
        repository.add(sample_property("A-000002")).unwrap();

        let mut edited = sample_property("A-000001");
        edited.price = 70000.0;
        repository.update("A-000001", edited).unwrap();

        let all = repository.get_all().unwrap();
        assert_eq!(all[0].price, 70000.0);
        assert_eq!(all[1].id, "A-000002");
    }

    #[test]
    fn repository_update_refuses_unknown_and_colliding_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));

        repository.add(sample_property("A-000001")).unwrap();
        repository.add(sample_property("A-000002")).unwrap();

        assert!(repository
            .update("A-000009", sample_property("A-000009"))
            .is_err());
        assert!(repository
            .update("A-000001", sample_property("A-000002"))
            .is_err());
    }

    #[test]
    fn repository_delete_requires_an_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let repository = PropertyRepository::new(dir.path().join("data_property.json"));

        repository.add(sample_property("A-000001")).unwrap();
        repository.delete("A-000001").unwrap();
        assert!(repository.get_all().unwrap().is_empty());
        assert!(repository.delete("A-000001").is_err());
    }

    #[test]
    fn repository_refuses_to_read_a_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_property.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let repository = PropertyRepository::new(&path);
        assert!(repository.get_all().is_err());
    }

    #[test]
    fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonFileStore::new(&path);
        store.set("data_property_version", "4").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("data_property_version").unwrap().as_deref(),
            Some("4")
        );
        assert_eq!(reopened.get("missing").unwrap(), None);
    }

    #[test]
    fn local_state_treats_garbage_as_a_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("state.json")));
        store.set("data_property_version", "not a number").unwrap();
        store.set("properties", "###").unwrap();

        let state = LocalState::new(store);
        assert_eq!(state.version(), None);
        assert!(state.properties().is_none());
    }

    fn image_config() -> Config {
        create_test_config()
    }

    #[tokio::test]
    async fn image_batch_resizes_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        image::RgbImage::from_pixel(2000, 500, image::Rgb([120, 30, 200]))
            .save(&input)
            .unwrap();
        let missing = dir.path().join("not-there.png");

        let processor = ImageProcessor::new(&image_config());
        let output_dir = dir.path().join("img").join("A-000042");
        let processed = processor
            .process_batch("A-000042", &[input, missing], &output_dir)
            .await;

        assert_eq!(processed.len(), 1);
        assert!(processed[0].filename.ends_with("_photo.jpg"));
        assert_eq!(
            processed[0].url,
            format!(
                "https://raw.example.com/listings/main/data/img/A-000042/{}",
                processed[0].filename
            )
        );

        let written = image::open(output_dir.join(&processed[0].filename)).unwrap();
        assert_eq!((written.width(), written.height()), (1080, 270));
    }

    #[tokio::test]
    async fn small_images_are_not_enlarged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("thumb.png");
        image::RgbImage::from_pixel(100, 80, image::Rgb([10, 10, 10]))
            .save(&input)
            .unwrap();

        let processor = ImageProcessor::new(&image_config());
        let output_dir = dir.path().join("img").join("A-000001");
        let processed = processor
            .process_batch("A-000001", &[input], &output_dir)
            .await;

        let written = image::open(output_dir.join(&processed[0].filename)).unwrap();
        assert_eq!((written.width(), written.height()), (100, 80));
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run_git(repo: &Path, args: &[&str]) {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Scratch work repo with a bare remote wired up as origin/main.
    fn scratch_repo(root: &Path) -> Config {
        let bare = root.join("remote.git");
        let work = root.join("work");
        std::fs::create_dir_all(work.join("data")).unwrap();

        run_git(root, &["init", "--bare", "remote.git"]);
        run_git(root, &["init", "work"]);
        run_git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(&work, &["config", "user.email", "admin@example.com"]);
        run_git(&work, &["config", "user.name", "Admin"]);
        run_git(&work, &["remote", "add", "origin", bare.to_str().unwrap()]);

        let mut config = create_test_config();
        config.repo_path = work.to_str().unwrap().to_string();
        config
    }

    #[tokio::test]
    async fn sync_short_circuits_on_a_clean_tree() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = scratch_repo(dir.path());

        let git = GitSync::new(&config);
        let outcome = git.sync("Admin: Update property data").await.unwrap();
        assert_eq!(outcome, SyncOutcome::NoChanges);
    }

    #[tokio::test]
    async fn sync_pushes_data_changes_to_the_remote() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = scratch_repo(dir.path());
        let work = Path::new(&config.repo_path);

        std::fs::write(work.join("data").join("data_property.json"), "[]\n").unwrap();

        let git = GitSync::new(&config);
        let outcome = git
            .sync("Admin: Create property data and images for A-000001")
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Pushed);

        let remote_head = Command::new("git")
            .arg("-C")
            .arg(dir.path().join("remote.git"))
            .args(["rev-parse", "main"])
            .output()
            .unwrap();
        assert!(remote_head.status.success());
    }

    #[tokio::test]
    async fn push_failure_is_reported_with_its_stage_and_leaves_the_commit() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = scratch_repo(dir.path());
        let work = Path::new(&config.repo_path);

        run_git(
            work,
            &["remote", "set-url", "origin", "/nonexistent/remote.git"],
        );
        std::fs::write(work.join("data").join("data_property.json"), "[]\n").unwrap();

        let git = GitSync::new(&config);
        let err = git
            .sync("Admin: Create property data and images for A-000001")
            .await
            .unwrap_err();
        assert_eq!(err.stage, SyncStage::Push);

        // Committed but unpushed: the retryable partial state.
        let log = Command::new("git")
            .arg("-C")
            .arg(work)
            .args(["log", "-1", "--format=%s"])
            .output()
            .unwrap();
        assert!(String::from_utf8_lossy(&log.stdout).contains("A-000001"));
    }

    #[tokio::test]
    async fn admin_mutations_bump_the_version_and_publish() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(scratch_repo(dir.path()));
        let admin = AdminService::new(&config);

        let created = admin
            .create_property(sample_property("A-000001"), Vec::new())
            .await
            .unwrap();
        assert_eq!(created.version, 1);
        assert!(matches!(created.sync, SyncStatus::Pushed));
        assert!(created.succeeded());

        let duplicate = admin
            .create_property(sample_property("A-000001"), Vec::new())
            .await;
        assert!(duplicate.is_err());

        let mut edited = sample_property("A-000001");
        edited.price = 80000.0;
        let updated = admin
            .update_property("A-000001", edited, Vec::new())
            .await
            .unwrap();
        assert_eq!(updated.version, 2);

        let deleted = admin.delete_property("A-000001").await.unwrap();
        assert_eq!(deleted.version, 3);
        assert_eq!(admin.properties().unwrap().len(), 0);
        assert_eq!(admin.current_version(), Some(3));
    }

    #[tokio::test]
    async fn admin_reports_a_failed_publish_without_losing_the_record() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut config = scratch_repo(dir.path());
        let work = Path::new(&config.repo_path).to_path_buf();
        run_git(
            &work,
            &["remote", "set-url", "origin", "/nonexistent/remote.git"],
        );
        config.git_remote = "origin".to_string();

        let admin = AdminService::new(&Arc::new(config));
        let report = admin
            .create_property(sample_property("A-000001"), Vec::new())
            .await
            .unwrap();

        assert!(!report.succeeded());
        assert!(matches!(report.sync, SyncStatus::Failed { .. }));
        // Record and version marker are persisted; only publication failed.
        assert_eq!(admin.properties().unwrap().len(), 1);
        assert_eq!(admin.current_version(), Some(1));
    }
}
