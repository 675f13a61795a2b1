//! Start-up data
//!
//! The registry is rebuilt from these records on every start.

use std::sync::OnceLock;

use tracing::warn;

use crate::auth::password::hash_password;
use crate::store::antiblat::{AntiblatEntry, AntiblatReason};
use crate::store::leaders::Leader;
use crate::store::points::PointEntry;
use crate::store::prices::{PriceBook, Service, ServiceCategory};
use crate::store::review::{ReviewStatus, ReviewTrail};
use crate::store::supervisors::Supervisor;
use crate::store::tasks::{Difficulty, Task, TaskSubmission};
use crate::store::team::{Deputy, Minister};
use crate::store::types::{Hospital, HospitalScope, Role};
use crate::store::warnings::Warning;
use crate::store::Registry;

const ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_PASSWORD: &str = "password123";

/// Hashes of the two seed passwords, computed once per process
struct SeedHashes {
    admin: String,
    default: String,
}

fn seed_hashes() -> &'static SeedHashes {
    static HASHES: OnceLock<SeedHashes> = OnceLock::new();
    HASHES.get_or_init(|| SeedHashes {
        admin: seed_hash(ADMIN_PASSWORD),
        default: seed_hash(DEFAULT_PASSWORD),
    })
}

fn seed_hash(password: &str) -> String {
    match hash_password(password) {
        Ok(hash) => hash,
        Err(err) => {
            // an empty hash never verifies, so the account stays locked
            warn!(error = %err, "Failed to hash seed password");
            String::new()
        }
    }
}

/// Registry populated with the demo organization
pub fn seeded_registry() -> Registry {
    let mut registry = Registry {
        prices: PriceBook::new(service_catalog()),
        ..Registry::default()
    };

    seed_accounts(&mut registry);
    seed_staff(&mut registry);
    seed_records(&mut registry);
    seed_tasks(&mut registry);

    registry
}

fn seed_accounts(registry: &mut Registry) {
    use HospitalScope::{Both, Ls, Lv};

    let SeedHashes { admin, default } = seed_hashes();
    let accounts = &mut registry.accounts;
    accounts.insert_seed(1, "admin", admin, Role::MainSupervisor, None, Some(Both));
    accounts.insert_seed(2, "leader_ls", default, Role::Leader, Some(Ls), None);
    accounts.insert_seed(3, "leader_lv", default, Role::Leader, Some(Lv), None);
    accounts.insert_seed(4, "minister", default, Role::Minister, Some(Both), None);
    accounts.insert_seed(
        6,
        "deputy_supervisor1",
        default,
        Role::DeputyMainSupervisor,
        None,
        Some(Ls),
    );
    accounts.insert_seed(
        7,
        "deputy_supervisor2",
        default,
        Role::DeputyMainSupervisor,
        None,
        Some(Lv),
    );
    accounts.insert_seed(8, "supervisor_ls", default, Role::Supervisor, None, Some(Ls));
    accounts.insert_seed(9, "supervisor_lv", default, Role::Supervisor, None, Some(Lv));
    accounts.insert_seed(10, "deputy1_ls", default, Role::Deputy, Some(Ls), None);
    accounts.insert_seed(11, "deputy1_lv", default, Role::Deputy, Some(Lv), None);
    accounts.insert_seed(
        12,
        "main_supervisor",
        default,
        Role::MainSupervisor,
        None,
        Some(Both),
    );
}

fn seed_staff(registry: &mut Registry) {
    registry.leaders.insert_seed(Leader {
        id: 1,
        nickname: "Иван Петров".to_string(),
        vk: Some("vk.com/ivanpetrov".to_string()),
        email: Some("ivan@example.com".to_string()),
        discord: Some("ivanpetrov#1234".to_string()),
        forum_link: Some("forum.example.com/ivanpetrov".to_string()),
        goal: Some(
            "Развитие больницы Los-Santos и повышение качества медицинских услуг".to_string(),
        ),
        login: "leader_ls".to_string(),
        created_at: "2023-01-15".to_string(),
        hospital: Hospital::Ls,
    });
    registry.leaders.insert_seed(Leader {
        id: 2,
        nickname: "Мария Козлова".to_string(),
        vk: Some("vk.com/mariakozlova".to_string()),
        email: Some("maria@example.com".to_string()),
        discord: Some("mariakozlova#5678".to_string()),
        forum_link: Some("forum.example.com/mariakozlova".to_string()),
        goal: Some(
            "Развитие больницы Las-Venturas и внедрение новых медицинских технологий".to_string(),
        ),
        login: "leader_lv".to_string(),
        created_at: "2023-01-20".to_string(),
        hospital: Hospital::Lv,
    });

    registry.team.insert_seed_deputy(Deputy {
        id: 3,
        position: 1,
        name: "Алексей Иванов".to_string(),
        vk: Some("vk.com/alexeyivanov".to_string()),
        login: "deputy1_ls".to_string(),
        appointed_at: "2023-03-05".to_string(),
        hospital: Hospital::Ls,
    });
    registry.team.insert_seed_deputy(Deputy {
        id: 6,
        position: 1,
        name: "Ольга Новикова".to_string(),
        vk: Some("vk.com/olganovikova".to_string()),
        login: "deputy1_lv".to_string(),
        appointed_at: "2023-03-10".to_string(),
        hospital: Hospital::Lv,
    });
    registry.team.insert_seed_minister(Minister {
        id: 2,
        name: "Елена Смирнова".to_string(),
        vk: Some("vk.com/elenasmirnova".to_string()),
        login: "minister".to_string(),
        appointed_at: "2023-02-10".to_string(),
        hospital: HospitalScope::Both,
    });

    let supervisors = [
        (1, "SuperAdmin_Main", Role::MainSupervisor, "main_supervisor", "2023-01-05", HospitalScope::Both),
        (2, "SuperAdmin_Deputy1", Role::DeputyMainSupervisor, "deputy_supervisor1", "2023-01-10", HospitalScope::Ls),
        (3, "SuperAdmin_Deputy2", Role::DeputyMainSupervisor, "deputy_supervisor2", "2023-01-15", HospitalScope::Lv),
        (4, "Supervisor_LS", Role::Supervisor, "supervisor_ls", "2023-02-15", HospitalScope::Ls),
        (5, "Supervisor_LV", Role::Supervisor, "supervisor_lv", "2023-02-20", HospitalScope::Lv),
    ];
    for (id, nickname, kind, login, created_at, assigned_hospital) in supervisors {
        registry.supervisors.insert_seed(Supervisor {
            id,
            nickname: nickname.to_string(),
            kind,
            login: login.to_string(),
            vk: Some(format!("vk.com/{}", login)),
            created_at: created_at.to_string(),
            assigned_hospital,
        });
    }
}

fn seed_records(registry: &mut Registry) {
    registry.antiblat.insert_seed(AntiblatEntry {
        id: 1,
        nickname: "Player_123".to_string(),
        rank: 7,
        vk: Some("vk.com/player123".to_string()),
        reason: AntiblatReason::Call,
        report_link: None,
        added_by: Some("leader".to_string()),
        added_by_id: Some(1),
        added_by_name: Some("Иван Петров".to_string()),
        created_at: "2023-03-15".to_string(),
        hospital: Hospital::Ls,
    });
    registry.antiblat.insert_seed(AntiblatEntry {
        id: 2,
        nickname: "Player_456".to_string(),
        rank: 6,
        vk: Some("vk.com/player456".to_string()),
        reason: AntiblatReason::Trusted,
        report_link: None,
        added_by: Some("leader".to_string()),
        added_by_id: Some(4),
        added_by_name: Some("Мария Козлова".to_string()),
        created_at: "2023-03-20".to_string(),
        hospital: Hospital::Lv,
    });

    let points = [
        (1, 2, HospitalScope::Ls, "Иван Петров", 10, "Набор персонала", "2023-01-05"),
        (2, 2, HospitalScope::Ls, "Иван Петров", 10, "Проведение мероприятия", "2023-02-10"),
        (3, 2, HospitalScope::Ls, "Иван Петров", 5, "Активная работа", "2023-03-15"),
        (4, 4, HospitalScope::Lv, "Мария Козлова", 8, "Помощь новичкам", "2023-01-20"),
        (5, 4, HospitalScope::Lv, "Мария Козлова", 10, "Организация работы", "2023-02-25"),
    ];
    for (id, user_id, hospital, name, amount, reason, date) in points {
        registry.points.insert_seed(PointEntry {
            id,
            user_id,
            user_role: Role::Leader,
            user_hospital: Some(hospital),
            user_name: name.to_string(),
            amount,
            reason: reason.to_string(),
            added_by: None,
            added_by_name: None,
            date: date.to_string(),
        });
    }

    registry.warnings.insert_seed(Warning {
        id: 1,
        user_id: 1,
        user_role: Role::Leader,
        user_hospital: Some(HospitalScope::Ls),
        user_name: "Иван Петров".to_string(),
        reason: "Нарушение субординации".to_string(),
        issued_by: Some("admin".to_string()),
        issued_by_id: Some(1),
        issued_by_name: Some("Admin".to_string()),
        created_at: "2023-02-20".to_string(),
    });
}

fn seed_tasks(registry: &mut Registry) {
    let tasks = [
        (
            1,
            "Обучение новичков",
            "Проведите обучение для 5 новых сотрудников и предоставьте доказательства.",
            "Соберите группу из 5 новых сотрудников (ранг 1-3), проведите обучение по основным \
             аспектам работы в Министерстве Здравоохранения, сделайте скриншоты и составьте отчет.",
            15,
            Difficulty::Medium,
            &[
                "Минимум 5 новых сотрудников",
                "Минимум 3 скриншота процесса обучения",
                "Отчет о проведенном обучении",
                "Список обученных сотрудников с их никами",
            ][..],
            true,
        ),
        (
            2,
            "Организация мероприятия",
            "Организуйте мероприятие для сотрудников и предоставьте отчет.",
            "Разработайте концепцию мероприятия, проведите его с участием минимум 10 сотрудников, \
             сделайте скриншоты и составьте отчет.",
            20,
            Difficulty::Hard,
            &[
                "Минимум 10 участников",
                "Минимум 5 скриншотов процесса проведения",
                "Подробный отчет о мероприятии",
                "Список участников с их никами",
            ][..],
            true,
        ),
        (
            3,
            "Набор персонала",
            "Наберите 3 новых сотрудника и проведите их обучение.",
            "Найдите и примите на работу 3 новых сотрудника, проведите их обучение, сделайте \
             скриншоты и составьте отчет о наборе.",
            15,
            Difficulty::Medium,
            &[
                "3 новых сотрудника",
                "Минимум 3 скриншота процесса обучения",
                "Отчет о проведенном обучении",
                "Информация о новых сотрудниках (ник, уровень, ВК)",
            ][..],
            true,
        ),
        (
            4,
            "Проверка работы отделений",
            "Проведите проверку работы всех отделений и составьте отчет.",
            "Проверьте все отделения больницы, сделайте скриншоты и подготовьте рекомендации.",
            10,
            Difficulty::Easy,
            &[
                "Проверка всех отделений",
                "Минимум 5 скриншотов процесса проверки",
                "Подробный отчет о состоянии каждого отделения",
                "Рекомендации по улучшению работы",
            ][..],
            false,
        ),
    ];

    for (id, title, description, detailed, points, difficulty, requirements, active) in tasks {
        registry.tasks.insert_seed_task(Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            detailed_description: detailed.to_string(),
            points,
            difficulty,
            requirements: requirements.iter().map(|r| r.to_string()).collect(),
            active,
        });
    }

    registry.tasks.insert_seed_submission(TaskSubmission {
        id: 1,
        task_id: 1,
        user_id: 1,
        user_role: Role::Leader,
        user_name: "Иван Петров".to_string(),
        title: "Обучение новичков".to_string(),
        submitted_at: "2023-03-20".to_string(),
        status: ReviewStatus::Pending,
        proof: "https://imgur.com/gallery/example1".to_string(),
        comment: Some(
            "Провел обучение для 5 новичков, все материалы в приложенных скриншотах.".to_string(),
        ),
        review: ReviewTrail::default(),
    });
    registry.tasks.insert_seed_submission(TaskSubmission {
        id: 2,
        task_id: 3,
        user_id: 2,
        user_role: Role::Deputy,
        user_name: "Елена Смирнова".to_string(),
        title: "Набор персонала".to_string(),
        submitted_at: "2023-02-15".to_string(),
        status: ReviewStatus::Approved,
        proof: "https://imgur.com/gallery/example2".to_string(),
        comment: Some("Набрал 3 новых сотрудника и провел их обучение.".to_string()),
        review: ReviewTrail {
            approved_at: Some("2023-02-16".to_string()),
            approved_by: Some("admin".to_string()),
            approved_by_id: Some(1),
            approved_by_name: Some("Admin".to_string()),
            ..ReviewTrail::default()
        },
    });
    registry.tasks.insert_seed_submission(TaskSubmission {
        id: 3,
        task_id: 2,
        user_id: 4,
        user_role: Role::Minister,
        user_name: "Дмитрий Соколов".to_string(),
        title: "Организация мероприятия".to_string(),
        submitted_at: "2023-01-10".to_string(),
        status: ReviewStatus::Rejected,
        proof: "https://imgur.com/gallery/example3".to_string(),
        comment: Some("Организовал мероприятие для всех сотрудников.".to_string()),
        review: ReviewTrail {
            rejected_at: Some("2023-01-11".to_string()),
            rejected_by: Some("admin".to_string()),
            rejected_by_id: Some(1),
            rejected_by_name: Some("Admin".to_string()),
            rejection_reason: Some("Недостаточно доказательств проведения мероприятия.".to_string()),
            ..ReviewTrail::default()
        },
    });
}

/// The live price list
pub fn service_catalog() -> Vec<ServiceCategory> {
    fn category(id: &str, name: &str, services: &[(u64, &str, i64)]) -> ServiceCategory {
        ServiceCategory {
            id: id.to_string(),
            name: name.to_string(),
            services: services
                .iter()
                .map(|&(id, name, price)| Service {
                    id,
                    name: name.to_string(),
                    price,
                })
                .collect(),
        }
    }

    vec![
        category(
            "basic",
            "Основные услуги",
            &[
                (1, "Лечение", 60000),
                (2, "Лечение личных охранников (( /healactor ))", 300000),
                (4, "Вывод наркозависимости", 150000),
                (9, "Медицинский осмотр (( /medcheck ))", 300000),
            ],
        ),
        category(
            "cards",
            "Медицинские карты",
            &[
                (5, "Медицинская карта (7 дней)", 50000),
                (6, "Медицинская карта (14 дней)", 80000),
                (7, "Медицинская карта (30 дней)", 130000),
                (8, "Медицинская карта (60 дней)", 175000),
            ],
        ),
        category(
            "additional",
            "Дополнительные услуги",
            &[
                (3, "Рецепт (1 шт.)", 30000),
                (10, "Медицинская страховка (1 неделя)", 400000),
                (11, "Антибиотик (1 шт.)", 25000),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eleven_services() {
        let book = PriceBook::new(service_catalog());
        assert_eq!(book.all_services().len(), 11);
        assert_eq!(book.category("cards").map(|c| c.services.len()), Some(4));
        assert_eq!(book.service(10).map(|s| s.price), Some(400000));
    }

    #[test]
    fn test_seed_accounts_authenticate() {
        let registry = seeded_registry();
        assert!(registry.accounts.authenticate("admin", "admin123").is_some());
        assert!(registry.accounts.authenticate("minister", DEFAULT_PASSWORD).is_some());
        assert!(registry.accounts.authenticate("admin", DEFAULT_PASSWORD).is_none());
    }

    #[test]
    fn test_seed_collections() {
        let registry = seeded_registry();
        assert_eq!(registry.accounts.all().len(), 11);
        assert_eq!(registry.antiblat.len(), 2);
        assert!(registry.leaders.for_hospital(Hospital::Ls).is_some());
        assert!(registry.team.minister().is_some());
        assert_eq!(registry.tasks.active().len(), 3);
        assert_eq!(registry.tasks.pending_submissions(), 1);
        assert!(registry.prices.requests().is_empty());
    }
}
