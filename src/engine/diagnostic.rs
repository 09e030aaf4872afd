// ==========================================
// 渔场管理系统 - 鱼病诊断引擎
// ==========================================
// 职责: 症状选择编辑 + 疾病匹配评分
// 输入: 内置知识库（data/medical_knowledge.json）+ SymptomSelection
// 输出: Diagnosis（病名/置信度/治疗/剂量，孟加拉语文本）
// ==========================================
// 评分规则:
// - 精确匹配（忽略大小写相等）+20，部分匹配（子串/关键词）+10
// - 置信度 = 精确/总数×60 + 部分/总数×30 + 多器官奖励 − 少症状惩罚
// - 置信度取整并限制在 0..=95
// ==========================================

use crate::domain::diagnostic::{
    Diagnosis, Disease, MedicalKnowledge, SelectedOrgan, SymptomSelection,
};
use thiserror::Error;
use tracing::{debug, instrument};

const KNOWLEDGE_JSON: &str = include_str!("../../data/medical_knowledge.json");

/// 健康状态条目 ID（不参与疾病匹配）
const HEALTHY_ID: &str = "healthy";

/// 常见多器官疾病
const MULTI_ORGAN_DISEASES: [&str; 7] = [
    "bacterial_septicemia",
    "systemic_infection",
    "mixed_infection",
    "tilv",
    "iridovirus",
    "streptococcus",
    "edwardsiella",
];

/// 孟加拉语器官词 ↔ 英文症状词
const ORGAN_TERMS: [(&str, &str); 9] = [
    ("ফুলকা", "gill"),
    ("চোখ", "eye"),
    ("ত্বক", "skin"),
    ("যকৃত", "liver"),
    ("অন্ত্র", "intestine"),
    ("প্লীহা", "spleen"),
    ("কিডনি", "kidney"),
    ("মস্তিষ্ক", "brain"),
    ("মাংসপেশি", "muscle"),
];

const MAX_CONFIDENCE: f64 = 95.0;
const LOW_CONFIDENCE: u8 = 30;

/// 诊断错误
#[derive(Error, Debug)]
pub enum DiagnosticError {
    #[error("知识库解析失败: {0}")]
    Knowledge(#[from] serde_json::Error),
}

/// 单个疾病的匹配结果
#[derive(Debug, Clone)]
struct DiseaseMatch<'a> {
    disease: &'a Disease,
    score: u32,
    confidence: u8,
    exact_matches: usize,
    organ_matches: usize,
    /// (器官名, 命中的状况)
    matched: Vec<(String, Vec<String>)>,
}

// ==========================================
// DiagnosticEngine
// ==========================================
#[derive(Debug, Clone)]
pub struct DiagnosticEngine {
    knowledge: MedicalKnowledge,
}

impl DiagnosticEngine {
    /// 加载内置知识库
    pub fn new() -> Result<Self, DiagnosticError> {
        let knowledge: MedicalKnowledge = serde_json::from_str(KNOWLEDGE_JSON)?;
        debug!(
            organs = knowledge.organs.len(),
            diseases = knowledge.diseases.len(),
            "诊断知识库已加载"
        );
        Ok(Self { knowledge })
    }

    pub fn with_knowledge(knowledge: MedicalKnowledge) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &MedicalKnowledge {
        &self.knowledge
    }

    // ==========================================
    // 症状选择
    // ==========================================

    /// 切换器官选择（未知器官忽略）
    pub fn toggle_organ(&self, selection: &mut SymptomSelection, organ_id: &str) {
        if let Some(pos) = selection.organs.iter().position(|o| o.id == organ_id) {
            selection.organs.remove(pos);
            return;
        }
        if let Some(organ) = self.knowledge.organ(organ_id) {
            selection.organs.push(SelectedOrgan {
                id: organ.id.clone(),
                name: organ.name.clone(),
                conditions: Vec::new(),
            });
        }
    }

    /// 切换已选器官上的某个状况
    pub fn toggle_condition(&self, selection: &mut SymptomSelection, organ_id: &str, condition: &str) {
        if let Some(organ) = selection.organs.iter_mut().find(|o| o.id == organ_id) {
            match organ.conditions.iter().position(|c| c == condition) {
                Some(pos) => {
                    organ.conditions.remove(pos);
                }
                None => organ.conditions.push(condition.to_string()),
            }
        }
    }

    // ==========================================
    // 诊断
    // ==========================================

    /// 分析症状
    #[instrument(skip(self, selection), fields(organs = selection.organs.len()))]
    pub fn analyze(&self, selection: &SymptomSelection) -> Diagnosis {
        let all_conditions = selection.all_conditions();

        if all_conditions.is_empty() {
            return Diagnosis {
                disease: "কোনো লক্ষণ নির্বাচন করা হয়নি".to_string(),
                confidence: 0,
                treatment: "অনুগ্রহ করে লক্ষণ নির্বাচন করুন".to_string(),
                dosage: String::new(),
            };
        }

        if self.all_healthy(selection) {
            return Diagnosis {
                disease: "স্বাস্থ্যকর অবস্থা".to_string(),
                confidence: 95,
                treatment: "কোনো চিকিৎসার প্রয়োজন নেই। ভালো খাবার এবং পরিচর্যা বজায় রাখুন।"
                    .to_string(),
                dosage: "নিয়মিত পানি পরিবর্তন এবং মানসম্পন্ন খাবার দিন।".to_string(),
            };
        }

        let mut matches: Vec<DiseaseMatch> = self
            .knowledge
            .diseases
            .iter()
            .filter(|d| d.id != HEALTHY_ID)
            .map(|d| self.score_disease(d, selection, all_conditions.len()))
            .filter(|m| m.confidence > 0)
            .collect();

        // 稳定排序: 置信度 > 精确匹配数 > 器官数 > 分数
        matches.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then(b.exact_matches.cmp(&a.exact_matches))
                .then(b.organ_matches.cmp(&a.organ_matches))
                .then(b.score.cmp(&a.score))
        });

        debug!(candidates = matches.len(), "疾病匹配完成");

        let Some(best) = matches.first() else {
            return Diagnosis {
                disease: "অজানা রোগ/অবস্থা".to_string(),
                confidence: 0,
                treatment: "একজন পশুচিকিৎসকের পরামর্শ নিন। লক্ষণগুলি আরও বিশদভাবে পর্যবেক্ষণ করুন।"
                    .to_string(),
                dosage: "পানি মান পরীক্ষা করুন এবং মাছের আচরণ মনিটর করুন।".to_string(),
            };
        };

        if best.confidence < LOW_CONFIDENCE && matches.len() > 1 {
            let top: Vec<&str> = matches
                .iter()
                .take(3)
                .map(|m| m.disease.name.as_str())
                .collect();
            return Diagnosis {
                disease: format!("সম্ভাব্য রোগ: {}", top.join(", ")),
                confidence: best.confidence,
                treatment: format!("প্রাথমিক চিকিৎসা: {}", best.disease.treatment),
                dosage: format!(
                    "ডোজ: {}। অন্যান্য সম্ভাবনা: {}",
                    best.disease.dosage,
                    top[1..].join(", ")
                ),
            };
        }

        let organ_info = if selection.organs.len() > 1 {
            let names: Vec<&str> = selection.organs.iter().map(|o| o.name.as_str()).collect();
            format!(
                " ({}টি অঙ্গে লক্ষণ: {})",
                selection.organs.len(),
                names.join(", ")
            )
        } else {
            String::new()
        };

        let symptom_info = if best.matched.is_empty() {
            String::new()
        } else {
            let lines: Vec<String> = best
                .matched
                .iter()
                .map(|(organ, conds)| format!("{}: {}", organ, conds.join(", ")))
                .collect();
            format!("\n\nমিলে যাওয়া লক্ষণ:\n{}", lines.join("\n"))
        };

        Diagnosis {
            disease: format!("{}{}", best.disease.name, organ_info),
            confidence: best.confidence,
            treatment: best.disease.treatment.clone(),
            dosage: format!("{}{}", best.disease.dosage, symptom_info),
        }
    }

    /// 所有已选状况均属于对应器官的健康状况
    fn all_healthy(&self, selection: &SymptomSelection) -> bool {
        selection.organs.iter().all(|selected| {
            selected.conditions.iter().all(|c| {
                self.knowledge
                    .organ(&selected.id)
                    .map(|o| o.conditions.healthy.contains(c))
                    .unwrap_or(false)
            })
        })
    }

    fn score_disease<'a>(
        &self,
        disease: &'a Disease,
        selection: &SymptomSelection,
        total_conditions: usize,
    ) -> DiseaseMatch<'a> {
        let mut score = 0u32;
        let mut exact_matches = 0usize;
        let mut partial_matches = 0usize;
        let mut matched = Vec::new();

        for organ in &selection.organs {
            let mut hits = Vec::new();
            for condition in &organ.conditions {
                if is_exact(condition, &disease.symptoms) {
                    exact_matches += 1;
                    score += 20;
                    hits.push(condition.clone());
                } else if is_partial(condition, &disease.symptoms) {
                    partial_matches += 1;
                    score += 10;
                    hits.push(condition.clone());
                }
            }
            if !hits.is_empty() {
                matched.push((organ.name.clone(), hits));
            }
        }

        let organ_matches = matched.len();
        let total = total_conditions as f64;
        let mut confidence = 0.0;
        if exact_matches > 0 {
            confidence += exact_matches as f64 / total * 60.0;
        }
        if partial_matches > 0 {
            confidence += partial_matches as f64 / total * 30.0;
        }
        if organ_matches > 1 {
            confidence += ((organ_matches - 1) as f64 * 10.0).min(20.0);
        }
        if disease.symptoms.len() < 3 && total_conditions > 5 {
            confidence = (confidence - 15.0).max(0.0);
        }
        if organ_matches > 1 && MULTI_ORGAN_DISEASES.contains(&disease.id.as_str()) {
            confidence += 15.0;
        }

        DiseaseMatch {
            disease,
            score,
            confidence: confidence.round().clamp(0.0, MAX_CONFIDENCE) as u8,
            exact_matches,
            organ_matches,
            matched,
        }
    }
}

// ==========================================
// 匹配规则
// ==========================================

fn is_exact(condition: &str, symptoms: &[String]) -> bool {
    let c = condition.to_lowercase();
    symptoms.iter().any(|s| s.to_lowercase() == c)
}

fn is_partial(condition: &str, symptoms: &[String]) -> bool {
    let c = condition.to_lowercase();
    let condition_words = keywords(&c);
    symptoms.iter().any(|symptom| {
        let s = symptom.to_lowercase();
        if c.contains(&s) || s.contains(&c) {
            return true;
        }
        let symptom_words = keywords(&s);
        condition_words.iter().any(|cw| {
            symptom_words.iter().any(|sw| {
                cw.contains(sw)
                    || sw.contains(cw)
                    || ORGAN_TERMS.iter().any(|(bn, en)| cw == bn && sw == en)
            })
        })
    })
}

/// 按空白/逗号/分号切词，保留长度 > 2 的词
fn keywords(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|w| w.chars().count() > 2)
        .collect()
}
