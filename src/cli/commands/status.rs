use crate::backend::ConversionBackend;
use crate::domain::TaskHandle;
use crate::polling::PollConfig;
use crate::App;
use anyhow::Result;

/// タスク状態を一度だけ取得してJSONで表示する
pub async fn execute_status<B, C>(app: &App<B, C>, task_id: &str) -> Result<()>
where
    B: ConversionBackend + 'static,
    C: PollConfig + Clone + 'static,
{
    let task_id = task_id.trim();
    if task_id.is_empty() {
        anyhow::bail!("task id must not be empty");
    }

    let status = app.status(&TaskHandle::new(task_id)).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
