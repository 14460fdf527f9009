use thiserror::Error;

use super::types::{Category, Polarity, QuestionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionIdError {
    #[error("expected 3 or 4 '_'-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("empty {0} segment")]
    EmptySegment(&'static str),

    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),

    #[error("invalid probe number in question type '{0}'")]
    InvalidProbeNumber(String),

    #[error("missing pos/neg polarity suffix in '{0}'")]
    MissingPolarity(String),

    #[error("order index in '{0}' must be a positive integer")]
    InvalidOrder(String),
}

impl QuestionId {
    /// Parse a question key such as `2406158_obj3_attr1_1pos`.
    ///
    /// Object-presence probes carry no question type: both `img_obj_1pos`
    /// and `img_obj__1pos` are accepted.
    pub fn parse(raw: &str) -> Result<Self, QuestionIdError> {
        let parts: Vec<&str> = raw.trim().split('_').collect();
        let (image_id, object_id, question_type, tail) = match parts.as_slice() {
            [image, object, tail] => (*image, *object, "", *tail),
            [image, object, kind, tail] => (*image, *object, *kind, *tail),
            _ => return Err(QuestionIdError::SegmentCount(parts.len())),
        };

        if image_id.is_empty() {
            return Err(QuestionIdError::EmptySegment("image_id"));
        }
        if object_id.is_empty() {
            return Err(QuestionIdError::EmptySegment("object_id"));
        }

        let category = parse_category(question_type)?;
        let (order_index, polarity) = parse_order_and_polarity(tail)?;

        Ok(QuestionId {
            image_id: image_id.to_string(),
            object_id: object_id.to_string(),
            category,
            order_index,
            polarity,
        })
    }
}

fn parse_category(question_type: &str) -> Result<Category, QuestionIdError> {
    if question_type.is_empty() {
        Ok(Category::Object)
    } else if let Some(n) = question_type.strip_prefix("attr") {
        Ok(Category::Attribute(parse_probe_number(n, question_type)?))
    } else if let Some(n) = question_type.strip_prefix("rel") {
        Ok(Category::Relation(parse_probe_number(n, question_type)?))
    } else {
        Err(QuestionIdError::UnknownQuestionType(question_type.to_string()))
    }
}

fn parse_probe_number(digits: &str, question_type: &str) -> Result<u32, QuestionIdError> {
    if !is_digits(digits) {
        return Err(QuestionIdError::InvalidProbeNumber(question_type.to_string()));
    }
    digits
        .parse()
        .map_err(|_| QuestionIdError::InvalidProbeNumber(question_type.to_string()))
}

fn parse_order_and_polarity(tail: &str) -> Result<(u32, Polarity), QuestionIdError> {
    let (digits, polarity) = if let Some(d) = tail.strip_suffix("pos") {
        (d, Polarity::Positive)
    } else if let Some(d) = tail.strip_suffix("neg") {
        (d, Polarity::Negative)
    } else {
        return Err(QuestionIdError::MissingPolarity(tail.to_string()));
    };

    if !is_digits(digits) {
        return Err(QuestionIdError::InvalidOrder(tail.to_string()));
    }
    match digits.parse::<u32>() {
        Ok(order) if order >= 1 => Ok((order, polarity)),
        _ => Err(QuestionIdError::InvalidOrder(tail.to_string())),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
