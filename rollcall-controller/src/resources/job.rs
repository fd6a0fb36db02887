//! Jobs
//!
//! A job is ready when it has completed. A job that gave up is a terminal
//! failure rather than "not ready".

use super::{ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use k8s_openapi::api::batch::v1::Job;
use rollcall_common::{Kind, ResourceDefinition, Verdict};
use std::sync::Arc;

impl ClusterObject for Job {
    const KIND: Kind = Kind::Job;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.jobs()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.job.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        _meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            let job = cluster.jobs().get(name).await?;
            Ok(job_verdict(&job))
        }
        .boxed()
    }
}

/// Judge a job from its observed status
pub fn job_verdict(job: &Job) -> Verdict {
    let Some(status) = job.status.as_ref() else {
        return Verdict::not_ready("job has not started");
    };

    for condition in status.conditions.iter().flatten() {
        if condition.status != "True" {
            continue;
        }
        match condition.type_.as_str() {
            "Complete" => return Verdict::Ready,
            "Failed" => {
                let detail = condition
                    .message
                    .clone()
                    .or_else(|| condition.reason.clone())
                    .unwrap_or_else(|| "job failed".to_string());
                return Verdict::failed(detail);
            }
            _ => {}
        }
    }

    let completions = job
        .spec
        .as_ref()
        .and_then(|spec| spec.completions)
        .unwrap_or(1);
    let succeeded = status.succeeded.unwrap_or(0);

    if succeeded >= completions {
        Verdict::Ready
    } else {
        Verdict::not_ready(format!("{}/{} completions", succeeded, completions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::batch::v1::{JobCondition, JobSpec, JobStatus};

    fn job_with(conditions: Vec<(&str, &str)>, succeeded: i32, completions: Option<i32>) -> Job {
        Job {
            spec: Some(JobSpec {
                completions,
                ..Default::default()
            }),
            status: Some(JobStatus {
                succeeded: Some(succeeded),
                conditions: Some(
                    conditions
                        .into_iter()
                        .map(|(type_, status)| JobCondition {
                            type_: type_.to_string(),
                            status: status.to_string(),
                            reason: Some("BackoffLimitExceeded".to_string()),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_condition_is_ready() {
        assert_eq!(job_verdict(&job_with(vec![("Complete", "True")], 0, None)), Verdict::Ready);
    }

    #[test]
    fn test_failed_condition_is_terminal() {
        let verdict = job_verdict(&job_with(vec![("Failed", "True")], 0, None));
        assert_eq!(verdict, Verdict::failed("BackoffLimitExceeded"));
    }

    #[test]
    fn test_completion_counts() {
        assert_eq!(job_verdict(&job_with(vec![], 1, None)), Verdict::Ready);
        assert_eq!(
            job_verdict(&job_with(vec![("Complete", "False")], 1, Some(3))),
            Verdict::not_ready("1/3 completions")
        );
        assert!(!job_verdict(&Job::default()).is_ready());
    }
}
