// ==========================================
// 渔场管理系统 - 鱼病诊断工作流
// ==========================================
// 职责: 症状分析、诊断保存、历史记录
// 诊断结论允许用户编辑后再保存
// ==========================================

use crate::api::{ApiError, ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::domain::diagnostic::{
    Diagnosis, MedicalDiagnostic, MedicalDiagnosticPayload, SymptomSelection,
};
use crate::engine::diagnostic::DiagnosticEngine;
use crate::i18n::t;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct DiagnosticService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
    engine: DiagnosticEngine,
}

impl DiagnosticService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> ApiResult<Self> {
        Ok(Self {
            client,
            notifier,
            engine: DiagnosticEngine::new()?,
        })
    }

    pub fn engine(&self) -> &DiagnosticEngine {
        &self.engine
    }

    pub fn toggle_organ(&self, selection: &mut SymptomSelection, organ_id: &str) {
        self.engine.toggle_organ(selection, organ_id);
    }

    pub fn toggle_condition(&self, selection: &mut SymptomSelection, organ_id: &str, condition: &str) {
        self.engine.toggle_condition(selection, organ_id, condition);
    }

    pub fn analyze(&self, selection: &SymptomSelection) -> Diagnosis {
        self.engine.analyze(selection)
    }

    /// 保存诊断
    ///
    /// # 参数
    /// - pond: 所选池塘（未选择时拒绝保存）
    /// - diagnosis: 诊断结论（可能已被用户编辑）
    /// - selection: 症状选择
    #[instrument(skip(self, diagnosis, selection))]
    pub async fn save(
        &self,
        pond: Option<i64>,
        diagnosis: &Diagnosis,
        selection: &SymptomSelection,
    ) -> ApiResult<MedicalDiagnostic> {
        let Some(pond) = pond else {
            let message = t("diagnostic.toast.missing_pond");
            self.notifier.error(&message);
            return Err(ApiError::Validation(message));
        };

        let payload = MedicalDiagnosticPayload::new(pond, diagnosis, selection);
        match self.client.create_medical_diagnostic(&payload).await {
            Ok(saved) => {
                info!(id = saved.id, "诊断已保存");
                self.notifier.success(&t("diagnostic.toast.saved"));
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "诊断保存失败");
                self.notifier.error(&t("diagnostic.toast.save_failed"));
                Err(e)
            }
        }
    }

    /// 已保存的诊断（按创建时间倒序）
    pub async fn history(&self) -> ApiResult<Vec<MedicalDiagnostic>> {
        match self.client.medical_diagnostics().await {
            Ok(mut list) => {
                list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(list)
            }
            Err(e) => {
                warn!(error = %e, "诊断记录加载失败");
                self.notifier.error(&t("diagnostic.toast.load_failed"));
                Err(e)
            }
        }
    }
}
