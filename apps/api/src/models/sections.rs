//! Typed item shapes for the seven editable sections, plus the compiled
//! default content shipped with the site. Defaults render immediately and
//! are superseded (but never deleted) once owner-authored content exists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillItem {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub period: String,
    pub title: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCard {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn values_of<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .map(|i| serde_json::to_value(i).unwrap_or(Value::Null))
        .collect()
}

pub fn default_about() -> Vec<Value> {
    values_of(&[AboutText {
        text: "Experienced sales administrator with 6+ years in the IT and Telecommunications \
               industry, proficient in customer service and sales support. I am a young \
               professional with a strong foundation in Information Systems, E-logistics as \
               well as Data Analytics with a current goal and great interest to become a \
               junior business analyst."
            .to_string(),
    }])
}

pub fn default_education() -> Vec<Value> {
    let entries = [
        (
            "International Institute of Business Analysis",
            "Entry Certificate in Business Analysis",
            "Present",
        ),
        (
            "University of the Western Cape",
            "Post Graduate Diploma in Computer Software & Media Applications: E-Logistics, \
             Supply Chain Management & Data Science",
            "Completed",
        ),
        ("University of the Western Cape", "BCom General", "Completed"),
        ("Leap Science and Math School", "Matric", "Completed"),
    ];
    let items: Vec<EducationItem> = entries
        .iter()
        .map(|(institution, degree, period)| EducationItem {
            institution: institution.to_string(),
            degree: degree.to_string(),
            period: period.to_string(),
        })
        .collect();
    values_of(&items)
}

pub fn default_certifications() -> Vec<Value> {
    let entries = [
        (
            "Entry Certificate in Business Analysis",
            "International Institute of Business Analysis",
            "In Progress",
        ),
        ("AI & Machine Learning For Everyone", "CAPACITI", "2025"),
        ("AI FOR EVERYONE", "CAPACITI", "2025"),
        ("Introduction to AI", "Google (Coursera)", "2025"),
        ("AI For Everyone", "Coursera", "2025"),
        ("Introduction to Responsible AI", "Coursera", "2025"),
        (
            "Active Listening Enhancing Communication Skills",
            "Coursera",
            "2025",
        ),
        ("Developing Interpersonal Skills", "Coursera", "2025"),
        ("Emotional Intelligence", "Coursera", "2025"),
        ("Financial Planning For Young Adults", "Coursera", "2025"),
        ("Finding Your Professional Voice", "Coursera", "2025"),
        ("Grit and Growth Mindset", "Coursera", "2025"),
        ("Introduction to Personal Branding", "Coursera", "2025"),
        ("Leading With Impact", "Coursera", "2025"),
        ("Preparation For Job Interviews", "Coursera", "2025"),
        (
            "Solving Problems With Creative & Critical Thinking",
            "Coursera",
            "2025",
        ),
        (
            "Verbal Communications and Presentation Skills",
            "Coursera",
            "2025",
        ),
        ("Work Smarter, Not Harder", "Coursera", "2025"),
        ("Write Professional Emails in English", "Coursera", "2025"),
    ];
    let items: Vec<CertificationItem> = entries
        .iter()
        .map(|(name, issuer, date)| CertificationItem {
            name: name.to_string(),
            issuer: issuer.to_string(),
            date: date.to_string(),
        })
        .collect();
    values_of(&items)
}

pub fn default_skills() -> Vec<Value> {
    let names = [
        "Data Analysis",
        "Customer Service",
        "Data Entry",
        "Data Visualisation/Storytelling",
        "Sales Support",
        "Communication and Collaboration",
        "Administration",
        "Report Compilation",
        "CRM",
        "Microsoft Suite",
        "Training and Development",
    ];
    let items: Vec<SkillItem> = names
        .iter()
        .map(|name| SkillItem {
            name: name.to_string(),
        })
        .collect();
    values_of(&items)
}

pub fn default_experience() -> Vec<Value> {
    let entries = [
        (
            "2025 - Present",
            "Digital Associate",
            "CAPACITI",
            "Supporting digital transformation initiatives and technology implementation \
             projects. Collaborating with cross-functional teams on digital solutions and \
             process improvements. Contributing to training and development programs for \
             digital literacy and participating in agile methodologies and continuous \
             improvement processes.",
        ),
        (
            "2022 - 2025",
            "Sales Administrator",
            "Vox Telecom",
            "Successfully conducted area feasibility checks and generated sales quotes.",
        ),
        (
            "2022 - 2023",
            "Assistant & Facilitator",
            "The Learning Trust",
            "Voluntarily group facilitation of school children between the ages of 6 and 16. \
             Contributed to alleviating the number of children affected by socioeconomic \
             issues due to not having a solid support structure or secure environment to be \
             in after school. Successfully managed after school coaches, organised \
             activities, facilitated discussions and attendance using an online platform \
             provided by the organisation.",
        ),
        (
            "2021 - 2022",
            "Data Capturing Specialist",
            "The National Sea Rescue Institute",
            "Contributed to saving over 1100 lives through administrative support to our \
             sales team which telephonically collected donations and attained new donors to \
             fund responsive station rescues. This role consisted of manual recording of \
             sales, capturing donor details, sending emails, renewing donor certificates, \
             compiling donation reports and training of new sales consultants on team \
             policies and procedures to enhance productivity and performance.",
        ),
        (
            "2019 - 2021",
            "Intern",
            "Vox Telecom",
            "Assisted sales teams achieve their monthly targets through supporting them with \
             administrative tasks such as filing, meeting coordination, compilation and \
             submission of business partner agreements as well as monitoring sales reports \
             for accuracy.",
        ),
        (
            "2018",
            "Sales Agent",
            "Teleperformance CPT",
            "Successfully responded to UK customer queries via the phone. Providing them \
             with different information they required with regards to their subscription \
             packages. Assisted customers with package top ups, SIM card blocking, phone \
             theft reporting as well as sim swap generation.",
        ),
        (
            "2017",
            "Customer Service Associate",
            "Amazon CPT",
            "Successfully interacted with USA customers providing them with sales support \
             through tracking of their orders, ensuring swift and accurate deliveries as \
             well as retrieval of lost or incorrectly delivered packages. Successfully \
             built rapport and resolved customer complaints by providing them with helpful \
             information in a timely and satisfactory manner. Achieved monthly call targets \
             which resulted in positive and constructive appraisal.",
        ),
    ];
    let items: Vec<ExperienceItem> = entries
        .iter()
        .map(|(period, title, company, description)| ExperienceItem {
            period: period.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
        })
        .collect();
    values_of(&items)
}

pub fn default_projects() -> Vec<Value> {
    // The projects grid starts empty; owners add their own entries.
    Vec::new()
}

pub fn default_contact() -> Vec<Value> {
    let items = [
        ContactCard {
            label: "Phone".to_string(),
            value: "0649731961".to_string(),
            link: Some("tel:0649731961".to_string()),
        },
        ContactCard {
            label: "Email".to_string(),
            value: "ysibene@gmail.com".to_string(),
            link: Some("mailto:ysibene@gmail.com".to_string()),
        },
        ContactCard {
            label: "LinkedIn".to_string(),
            value: "View Profile".to_string(),
            link: Some("https://www.linkedin.com/in/yonela-sibene".to_string()),
        },
        ContactCard {
            label: "GitHub".to_string(),
            value: "View Profile".to_string(),
            link: Some("https://github.com/yonelasibene".to_string()),
        },
        ContactCard {
            label: "Photo".to_string(),
            value: "Contact photo".to_string(),
            link: None,
        },
        ContactCard {
            label: "Curriculum Vitae".to_string(),
            value: "CV document".to_string(),
            link: None,
        },
    ];
    values_of(&items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_nonempty_except_projects() {
        assert_eq!(default_about().len(), 1);
        assert_eq!(default_education().len(), 4);
        assert_eq!(default_certifications().len(), 19);
        assert_eq!(default_skills().len(), 11);
        assert_eq!(default_experience().len(), 7);
        assert!(default_projects().is_empty());
        assert_eq!(default_contact().len(), 6);
    }

    #[test]
    fn test_default_values_deserialize_as_typed_items() {
        let certs: Vec<CertificationItem> = default_certifications()
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        assert_eq!(certs[0].issuer, "International Institute of Business Analysis");
        assert_eq!(certs[0].date, "In Progress");

        let experience: Vec<ExperienceItem> = default_experience()
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        // Timeline defaults are newest-first.
        assert_eq!(experience[0].period, "2025 - Present");
        assert_eq!(experience.last().unwrap().period, "2017");
    }
}
