// ==========================================
// 渔场管理系统 - 鱼病诊断
// ==========================================
// 职责: 知识库结构、症状选择、诊断结果、持久化记录
// 知识库文本为孟加拉语
// ==========================================

use crate::domain::numeric::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 知识库
// ==========================================

/// 器官状况列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganConditions {
    #[serde(default)]
    pub healthy: Vec<String>,
    #[serde(default)]
    pub unhealthy: Vec<String>,
}

/// 器官
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organ {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: OrganConditions,
}

/// 疾病
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub dosage: String,
}

/// 诊断知识库
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalKnowledge {
    pub organs: Vec<Organ>,
    pub diseases: Vec<Disease>,
}

impl MedicalKnowledge {
    pub fn organ(&self, id: &str) -> Option<&Organ> {
        self.organs.iter().find(|o| o.id == id)
    }

    pub fn disease(&self, id: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == id)
    }
}

// ==========================================
// 症状选择
// ==========================================

/// 已选器官及其状况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOrgan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// 症状选择（按选择顺序保存器官）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomSelection {
    pub organs: Vec<SelectedOrgan>,
}

impl SymptomSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有已选状况（按器官顺序展开）
    pub fn all_conditions(&self) -> Vec<String> {
        self.organs.iter().flat_map(|o| o.conditions.iter().cloned()).collect()
    }

    pub fn is_selected(&self, organ_id: &str) -> bool {
        self.organs.iter().any(|o| o.id == organ_id)
    }

    pub fn clear(&mut self) {
        self.organs.clear();
    }
}

// ==========================================
// 诊断结果
// ==========================================

/// 诊断结论（可由用户编辑后保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease: String,
    /// 置信度 0..=95
    pub confidence: u8,
    pub treatment: String,
    pub dosage: String,
}

/// 诊断保存载荷
#[derive(Debug, Clone, Serialize)]
pub struct MedicalDiagnosticPayload {
    pub pond: i64,
    pub disease_name: String,
    pub confidence_percentage: String,
    pub recommended_treatment: String,
    pub dosage_application: String,
    pub selected_organs: Vec<SelectedOrgan>,
    pub selected_symptoms: Vec<String>,
    pub notes: String,
}

impl MedicalDiagnosticPayload {
    pub fn new(pond: i64, diagnosis: &Diagnosis, selection: &SymptomSelection) -> Self {
        Self {
            pond,
            disease_name: diagnosis.disease.clone(),
            confidence_percentage: diagnosis.confidence.to_string(),
            recommended_treatment: diagnosis.treatment.clone(),
            dosage_application: diagnosis.dosage.clone(),
            selected_organs: selection.organs.clone(),
            selected_symptoms: selection.all_conditions(),
            notes: String::new(),
        }
    }
}

/// 已保存的诊断记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalDiagnostic {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub pond: Option<i64>,
    #[serde(default)]
    pub pond_name: Option<String>,
    #[serde(default)]
    pub disease_name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub confidence_percentage: f64,
    #[serde(default)]
    pub recommended_treatment: String,
    #[serde(default)]
    pub dosage_application: String,
    #[serde(default)]
    pub selected_organs: Vec<SelectedOrgan>,
    #[serde(default)]
    pub selected_symptoms: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_applied: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
