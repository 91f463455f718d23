//! 仿真 - 一阶模拟过程
//!
//! 用于演示和测试的闭环：控制输出被钳位到 `[-max_step, max_step]`
//! 后直接叠加到过程变量上。钳位是仿真对象的特性，控制器本身不做钳位。
//!
//! # 示例
//!
//! ```rust
//! use simple_pid::PidController;
//! use simple_pid::simulation::{SimulatedProcess, Simulation};
//!
//! let mut pid = PidController::new(1.2, 1.0, 0.01, 1.0)?;
//! pid.set_target(10.0)?;
//!
//! let mut sim = Simulation::new(pid, SimulatedProcess::new(0.0, 0.1)?, 0.05);
//! let outcome = sim.run(500, |_| {})?;
//! assert!(outcome.converged);
//! # Ok::<(), simple_pid::PidError>(())
//! ```

use crate::controller::PidController;
use crate::error::{PidError, ensure_finite};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 模拟过程：每步变化量受限的积分器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedProcess {
    value: f64,
    max_step: f64,
}

impl SimulatedProcess {
    /// 创建模拟过程
    ///
    /// 两个参数都必须是有限实数；`max_step` 取绝对值使用。
    pub fn new(initial: f64, max_step: f64) -> Result<Self, PidError> {
        Ok(Self {
            value: ensure_finite("initial", initial)?,
            max_step: ensure_finite("max_step", max_step)?.abs(),
        })
    }

    /// 当前过程变量
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 直接覆盖过程变量（外部测量到达）
    pub fn set_value(&mut self, value: f64) -> Result<(), PidError> {
        self.value = ensure_finite("pv", value)?;
        Ok(())
    }

    /// 施加控制量，返回实际施加的变化量
    pub fn apply(&mut self, output: f64) -> f64 {
        let delta = output.clamp(-self.max_step, self.max_step);
        self.value += delta;
        delta
    }
}

/// 单步遥测记录
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// 步序号（从 1 开始）
    pub step: usize,
    /// 设定值
    pub sv: f64,
    /// 施加控制量之后的过程变量
    pub pv: f64,
    /// 比例项
    pub p: f64,
    /// 积分项
    pub i: f64,
    /// 微分项
    pub d: f64,
    /// 控制输出
    pub output: f64,
}

/// 何时检查容差
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// 先更新、施加，再检查（交互式容差演示）
    #[default]
    AfterStep,

    /// 先检查，已在容差内则本步不再更新（消息驱动演示）
    BeforeStep,
}

/// 仿真结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOutcome {
    /// 实际执行的控制步数
    pub steps: usize,
    /// 是否进入容差带
    pub converged: bool,
    /// 最终过程变量
    pub final_pv: f64,
}

/// 控制器 + 模拟过程的闭环
#[derive(Debug, Clone)]
pub struct Simulation {
    controller: PidController,
    process: SimulatedProcess,
    tolerance: f64,
    policy: StopPolicy,
    steps: usize,
}

impl Simulation {
    /// 创建闭环
    pub fn new(controller: PidController, process: SimulatedProcess, tolerance: f64) -> Self {
        Self {
            controller,
            process,
            tolerance,
            policy: StopPolicy::default(),
            steps: 0,
        }
    }

    /// 设置容差检查时机
    pub fn with_stop_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 控制器
    pub fn controller(&self) -> &PidController {
        &self.controller
    }

    /// 模拟过程
    pub fn process(&self) -> &SimulatedProcess {
        &self.process
    }

    /// 已执行的步数
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// 容差检查时机
    pub fn stop_policy(&self) -> StopPolicy {
        self.policy
    }

    /// 新的设定值到达
    ///
    /// 积分累积和上一次误差都保留。
    pub fn set_setpoint(&mut self, sv: f64) -> Result<(), PidError> {
        self.controller.set_target(sv)
    }

    /// 新的过程变量测量到达
    pub fn set_process_value(&mut self, pv: f64) -> Result<(), PidError> {
        self.process.set_value(pv)
    }

    /// `|pv - sv| <= tolerance`
    pub fn is_within_tolerance(&self) -> bool {
        (self.process.value() - self.controller.target()).abs() <= self.tolerance
    }

    /// 执行一步：更新控制器，把输出施加到模拟过程
    pub fn step(&mut self) -> Result<Sample, PidError> {
        let output = self.controller.update(self.process.value())?;
        self.process.apply(output);
        self.steps += 1;

        let terms = self.controller.terms();
        Ok(Sample {
            step: self.steps,
            sv: self.controller.target(),
            pv: self.process.value(),
            p: terms.p,
            i: terms.i,
            d: terms.d,
            output,
        })
    }

    /// 按停止策略执行一个周期
    ///
    /// 返回 `None` 表示已在容差内、循环应停止。
    pub fn tick(&mut self) -> Result<Option<Sample>, PidError> {
        if self.policy == StopPolicy::BeforeStep && self.is_within_tolerance() {
            return Ok(None);
        }
        self.step().map(Some)
    }

    /// `AfterStep` 策略下，刚执行完的一步是否已进入容差
    pub fn finished_after_step(&self) -> bool {
        self.policy == StopPolicy::AfterStep && self.is_within_tolerance()
    }

    /// 以当前状态生成结果
    pub fn outcome(&self, steps: usize) -> SimulationOutcome {
        SimulationOutcome {
            steps,
            converged: self.is_within_tolerance(),
            final_pv: self.process.value(),
        }
    }

    /// 运行直到进入容差或达到 `max_steps`
    ///
    /// 每一步的记录都会交给 `on_sample`。
    pub fn run<F>(&mut self, max_steps: usize, mut on_sample: F) -> Result<SimulationOutcome, PidError>
    where
        F: FnMut(&Sample),
    {
        let mut executed = 0;
        while executed < max_steps {
            let Some(sample) = self.tick()? else {
                break;
            };
            executed += 1;
            on_sample(&sample);

            if self.finished_after_step() {
                break;
            }
        }

        let outcome = self.outcome(executed);
        tracing::debug!(?outcome, "Simulation finished");
        Ok(outcome)
    }
}
