//! End-to-end over files: group attributes → repartition → load → export.
//!
//! Every test builds a small dataset under its own temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use visual_genome::dataset::{
    add_attributes_to_scene_graphs, load_all_qas, load_all_region_descriptions,
    load_region_descriptions, read_scene_record, repartition,
};
use visual_genome::export::export_cypher_dump;
use visual_genome::{Error, MemoryOntology, ObjectId, PipelineConfig, SceneGraphLoader, SimilarityCache};

struct Dataset {
    root: PathBuf,
    config: PipelineConfig,
}

impl Dataset {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("vg-e2e-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();

        let mut config = PipelineConfig::with_data_dir(&root);
        config.similarity_cache_path = root.join("cache").join("similarity.json");

        write(&root, "image_data.json", r#"[
            {"image_id": 1, "url": "http://img/1.jpg", "width": 800, "height": 600, "coco_id": 42},
            {"image_id": 2, "url": "http://img/2.jpg", "width": 640, "height": 480, "coco_id": null}
        ]"#);
        write(&root, "synsets.json", r#"[
            {"synset_name": "dog.n.01", "synset_definition": "from synsets.json"}
        ]"#);
        write(&root, "scene_graphs.json", r#"[
            {"image_id": 1,
             "objects": [
                {"object_id": 1, "x": 10, "y": 10, "w": 50, "h": 50, "names": ["dog"], "synsets": ["dog.n.01"]},
                {"object_id": 2, "x": 300, "y": 200, "w": 100, "h": 100, "names": ["puppy"], "synsets": ["puppy.n.01"]},
                {"object_id": 1, "x": 10, "y": 10, "w": 50, "h": 50, "names": ["dog"], "synsets": ["dog.n.01"]}
             ],
             "relationships": [
                {"relationship_id": 10, "predicate": "next to", "subject_id": 1, "object_id": 2},
                {"relationship_id": 11, "predicate": "on", "subject_id": 1, "object_id": 99}
             ]},
            {"image_id": 2, "objects": [], "relationships": []},
            {"image_id": 4, "objects": [], "relationships": []}
        ]"#);
        write(&root, "attributes.json", r#"[
            {"image_id": 1, "attributes": [
                {"object_id": 1, "x": 12, "y": 12, "w": 40, "h": 40, "names": ["dog"],
                 "synsets": ["dog.n.01"], "attributes": ["brown"]},
                {"object_id": 55, "x": 0, "y": 0, "w": 1, "h": 1, "names": ["ghost"],
                 "synsets": [], "attributes": ["faint"]}
            ]}
        ]"#);
        write(&root, "visa.jsonl", concat!(
            r#"{"wordnet_id": "dog.n.01", "concept_id": "dog", "data": {"attributes": {"behaviour": ["beh_-_barks"]}, "types": ["pet"]}}"#,
            "\n\n",
        ));
        write(&root, "gw_vg_mapping.json", r#"{
            "42": {"gw_objects": [{"id": 1, "category": "dog", "bbox": [650, 500, 100, 50]}]}
        }"#);
        write(&root, "region_descriptions.json", r#"[
            {"id": 1, "regions": [
                {"region_id": 500, "image_id": 1, "phrase": "a brown dog", "x": 10, "y": 10, "width": 50, "height": 50},
                {"region_id": 501, "image_id": 1, "phrase": "a sleepy puppy", "x": 300, "y": 200, "width": 100, "height": 100}
            ]},
            {"id": 2, "regions": []}
        ]"#);
        write(&root, "question_answers.json", r#"[
            {"id": 1, "qas": [
                {"qa_id": 900, "image_id": 1, "question": "What is next to the dog?", "answer": "A puppy.",
                 "q_objects": [{"object_id": 1, "x": 10, "y": 10, "w": 50, "h": 50, "names": ["dog"], "synsets": ["dog.n.01"]}],
                 "a_objects": [{"object_id": 2, "x": 300, "y": 200, "w": 100, "h": 100, "names": ["puppy"], "synsets": ["puppy.n.01"]}]}
            ]},
            {"id": 2, "qas": []}
        ]"#);
        write(&root, "ontology.json", r#"[
            {"name": "entity.n.01", "definition": "that which exists"},
            {"name": "animal.n.01", "definition": "a living organism", "hypernyms": ["entity.n.01"]},
            {"name": "dog.n.01", "definition": "a domesticated canid", "hypernyms": ["animal.n.01"]},
            {"name": "puppy.n.01", "definition": "a young dog", "hypernyms": ["dog.n.01"]}
        ]"#);

        Self { root, config }
    }

    fn ontology(&self) -> MemoryOntology {
        MemoryOntology::from_path(self.root.join("ontology.json")).unwrap()
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn write(root: &Path, name: &str, contents: &str) {
    fs::write(root.join(name), contents).unwrap();
}

#[test]
fn test_repartition_writes_enriched_files() {
    let data = Dataset::new("repartition");
    let ontology = data.ontology();
    let mut cache = SimilarityCache::load(&data.config.similarity_cache_path);
    assert!(cache.is_empty());

    let stats = repartition(&data.config, &ontology, &mut cache).unwrap();
    assert_eq!(stats.records_seen, 3);
    assert_eq!(stats.written, 1);
    assert_eq!(stats.unknown_image, 1);
    assert_eq!(stats.without_auxiliary, 1);
    assert_eq!(stats.synthesis.fallback_matches, 1);
    assert_eq!(stats.synthesis.auxiliary_objects, 1);
    assert!(stats.finished_at.unwrap() >= stats.started_at);

    assert!(!data.config.scene_graph_path(2).exists());
    let record = read_scene_record(data.config.scene_graph_path(1)).unwrap();
    assert_eq!(record.objects.len(), 4);
    let puppy = &record.objects[1];
    assert_eq!(puppy.situated_attributes.clone().unwrap(), vec!["center"]);
    assert_eq!(puppy.abstract_attributes.clone().unwrap(), vec!["barks", "pet"]);
    let gw = &record.objects[3];
    assert!(gw.guesswhat);
    assert_eq!(gw.attributes.clone().unwrap(), vec!["barks", "pet"]);

    // Whole-pixel geometry stays integral on disk.
    let written = fs::read_to_string(data.config.scene_graph_path(1)).unwrap();
    assert!(written.contains(r#""x":10,"y":10,"w":50,"h":50"#), "{written}");

    // Flushed once at the end, and readable by the next run.
    let reloaded = SimilarityCache::load(&data.config.similarity_cache_path);
    assert_eq!(reloaded.get("puppy.n.01"), Some("dog.n.01"));
}

#[test]
fn test_load_after_repartition() {
    let data = Dataset::new("load");
    let ontology = data.ontology();
    add_attributes_to_scene_graphs(&data.config).unwrap();
    repartition(&data.config, &ontology, &mut SimilarityCache::in_memory()).unwrap();

    let loader = SceneGraphLoader::open(&data.config, &ontology).unwrap();
    let (graph, skips) = loader.load_scene_graph(1).unwrap().unwrap();

    assert_eq!(graph.objects.len(), 3);
    assert_eq!(graph.relationships.len(), 1);
    assert_eq!(skips.relationships, 1);
    assert_eq!(skips.attributes, 1);
    assert!(graph.is_consistent());

    let attr = &graph.attributes[0];
    assert_eq!(attr.target, ObjectId::Primary(1));
    assert_eq!(attr.values, vec!["brown"]);
    // The table definition wins over the ontology's.
    assert_eq!(attr.object.senses[0].as_sense().unwrap().definition, "from synsets.json");

    let mut script = Vec::new();
    export_cypher_dump(&graph, &mut script).unwrap();
    let script = String::from_utf8(script).unwrap();
    assert!(script.contains("_id: 'gw_1'"));
    assert!(script.contains("[:NEXT_TO"));
}

#[test]
fn test_missing_file_and_unknown_image() {
    let data = Dataset::new("missing");
    let ontology = data.ontology();
    let loader = SceneGraphLoader::open(&data.config, &ontology).unwrap();

    assert_eq!(loader.image(2).map(|i| i.width), Some(640));
    assert!(loader.load_scene_graph(2).unwrap().is_none());
    assert!(matches!(loader.load_scene_graph(77), Err(Error::NotFound(_))));
}

#[test]
fn test_relationship_bounds() {
    let data = Dataset::new("bounds");
    let ontology = data.ontology();
    repartition(&data.config, &ontology, &mut SimilarityCache::in_memory()).unwrap();

    let loader = SceneGraphLoader::open(&data.config, &ontology).unwrap();
    let (graphs, skips) = loader.load_scene_graphs([1, 2]).unwrap();
    assert_eq!(graphs.len(), 1);
    assert_eq!(skips.relationships, 1);

    let strict = SceneGraphLoader::open(&data.config, &ontology)
        .unwrap()
        .with_relationship_bounds(2, 5);
    let (graphs, _) = strict.load_scene_graphs([1]).unwrap();
    assert!(graphs.is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let data = Dataset::new("config");
    let mut config = data.config.clone();
    config.similarity_threshold = 1.5;
    let err = repartition(&config, &data.ontology(), &mut SimilarityCache::in_memory()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_loader_rejects_inverted_bounds() {
    let data = Dataset::new("inverted");
    let ontology = data.ontology();
    let mut config = data.config.clone();
    config.min_relationships = 5;
    config.max_relationships = 1;
    assert!(matches!(SceneGraphLoader::open(&config, &ontology), Err(Error::Config(_))));

    let loader = SceneGraphLoader::open(&data.config, &ontology)
        .unwrap()
        .with_relationship_bounds(3, 2);
    assert!(matches!(loader.load_scene_graphs([1]), Err(Error::Config(_))));
}

#[test]
fn test_region_descriptions() {
    let data = Dataset::new("regions");

    let selected = load_region_descriptions(&data.config, [1, 2]).unwrap();
    assert_eq!(selected.len(), 1, "images without regions are left out");
    assert_eq!(selected[0].image.url, "http://img/1.jpg");
    let phrases: Vec<&str> = selected[0].regions.iter().map(|r| r.phrase.as_str()).collect();
    assert_eq!(phrases, vec!["a brown dog", "a sleepy puppy"]);

    assert!(load_region_descriptions(&data.config, [2]).unwrap().is_empty());

    let all = load_all_region_descriptions(&data.config).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[1].regions.is_empty());
    assert_eq!(all[1].image.height, 480);
}

#[test]
fn test_question_answers() {
    let data = Dataset::new("qas");
    let all = load_all_qas(&data.config).unwrap();
    assert_eq!(all.len(), 2);

    let qa = &all[0].qas[0];
    assert_eq!(qa.id, 900);
    assert_eq!(qa.answer, "A puppy.");
    assert_eq!(qa.question_objects[0].id, ObjectId::Primary(1));
    assert_eq!(qa.answer_objects[0].names, vec!["puppy"]);
    assert!(all[1].qas.is_empty());
}

#[test]
fn test_region_for_unknown_image_is_an_error() {
    let data = Dataset::new("regions-unknown");
    write(&data.root, "region_descriptions.json", r#"[{"id": 9, "regions": []}]"#);
    assert!(matches!(load_all_region_descriptions(&data.config), Err(Error::NotFound(_))));
    // Filtered out before the image is looked up.
    assert!(load_region_descriptions(&data.config, [1]).unwrap().is_empty());
}
