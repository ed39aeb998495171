//! Region descriptions and question-answer pairs.
//!
//! Both files hold one record per image, keyed by image id; every record is
//! paired with its `Image` from the image metadata.

use hashbrown::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::merge::object_from_raw;
use crate::model::{Image, ImageQuestions, ImageRegions, Object, ObjectId, QuestionAnswer, Region};
use crate::raw::{QuestionAnswerRecord, RawObject, RegionRecord};
use crate::{Error, Result};

use super::{load_image_index, read_json};

fn image_for(images: &HashMap<u64, Image>, image_id: u64) -> Result<Image> {
    images
        .get(&image_id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Image {image_id}")))
}

/// Pair one record of `region_descriptions.json` with its image.
///
/// Regions without their own `image_id` take the record's.
pub fn parse_region_descriptions(record: RegionRecord, image: Image) -> ImageRegions {
    let regions = record
        .regions
        .into_iter()
        .map(|r| {
            let bbox = r.bbox();
            Region::new(r.region_id, r.image_id.unwrap_or(record.id), r.phrase, bbox)
        })
        .collect();
    ImageRegions { image, regions }
}

/// Pair one record of `question_answers.json` with its image.
pub fn parse_question_answers(record: QuestionAnswerRecord, image: Image) -> ImageQuestions {
    let objects = |raws: &[RawObject]| -> Vec<Object> {
        raws.iter()
            .map(|raw| object_from_raw(ObjectId::scoped(raw.object_id, raw.guesswhat), raw))
            .collect()
    };
    let qas = record
        .qas
        .iter()
        .map(|qa| QuestionAnswer {
            id: qa.qa_id,
            image_id: qa.image_id.unwrap_or(record.id),
            question: qa.question.clone(),
            answer: qa.answer.clone(),
            question_objects: objects(&qa.q_objects),
            answer_objects: objects(&qa.a_objects),
        })
        .collect();
    ImageQuestions { image, qas }
}

/// Region descriptions of the images in `image_ids` that have at least one
/// region, in file order.
pub fn load_region_descriptions(
    config: &PipelineConfig,
    image_ids: impl IntoIterator<Item = u64>,
) -> Result<Vec<ImageRegions>> {
    let wanted: HashSet<u64> = image_ids.into_iter().collect();
    let images = load_image_index(config.image_data_path())?;
    let records: Vec<RegionRecord> = read_json(&config.region_descriptions_path())?;

    let mut output = Vec::new();
    for record in records {
        if !wanted.contains(&record.id) || record.regions.is_empty() {
            continue;
        }
        let image = image_for(&images, record.id)?;
        output.push(parse_region_descriptions(record, image));
    }
    tracing::info!(images = output.len(), requested = wanted.len(), "loaded region descriptions");
    Ok(output)
}

/// Region descriptions of every image, in file order.
pub fn load_all_region_descriptions(config: &PipelineConfig) -> Result<Vec<ImageRegions>> {
    let images = load_image_index(config.image_data_path())?;
    let records: Vec<RegionRecord> = read_json(&config.region_descriptions_path())?;
    let output = records
        .into_iter()
        .map(|record| {
            let image = image_for(&images, record.id)?;
            Ok(parse_region_descriptions(record, image))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(images = output.len(), "loaded region descriptions");
    Ok(output)
}

/// Question-answer pairs of every image, in file order.
pub fn load_all_qas(config: &PipelineConfig) -> Result<Vec<ImageQuestions>> {
    let images = load_image_index(config.image_data_path())?;
    let records: Vec<QuestionAnswerRecord> = read_json(&config.question_answers_path())?;
    let output = records
        .into_iter()
        .map(|record| {
            let image = image_for(&images, record.id)?;
            Ok(parse_question_answers(record, image))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(images = output.len(), "loaded question answers");
    Ok(output)
}
